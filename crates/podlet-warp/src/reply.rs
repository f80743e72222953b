//! Responses for processed requests

use crate::error::{AdapterError, PodletRejection};
use http::header::{HeaderValue, CONTENT_TYPE, LINK, LOCATION};
use http::{Response, StatusCode};
use podlet_core::{Incoming, Podlet};
use std::convert::Infallible;
use warp::Rejection;

/// Response header carrying the podlet version
pub const PODLET_VERSION: &str = "podlet-version";

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json; charset=utf-8";

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, AdapterError> {
    HeaderValue::from_str(value).map_err(|_| AdapterError::InvalidHeader { name })
}

/// Attach the `Link` and `podlet-version` headers
///
/// `Link` is left out when the request has no assets.
///
/// # Errors
/// Returns [`AdapterError::InvalidHeader`] if a value cannot be encoded.
pub fn decorate(
    response: &mut Response<String>,
    podlet: &Podlet,
    incoming: &Incoming,
) -> Result<(), AdapterError> {
    let headers = response.headers_mut();
    headers.insert(PODLET_VERSION, header_value(PODLET_VERSION, podlet.version())?);

    let link = incoming.link_header();
    if !link.is_empty() {
        headers.insert(LINK, header_value("link", &link)?);
    }
    Ok(())
}

/// Render a fragment and answer with it
///
/// # Errors
/// Returns [`AdapterError::Podlet`] if rendering fails.
pub fn podium_send(
    podlet: &Podlet,
    incoming: &Incoming,
    fragment: &str,
    args: &[&str],
) -> Result<Response<String>, AdapterError> {
    let body = podlet.render(incoming, fragment, args)?;

    let mut response = Response::new(body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML));
    decorate(&mut response, podlet, incoming)?;
    Ok(response)
}

/// Answer a request the proxy took over
///
/// Redirects to the resolved target, or answers `204 No Content` when the
/// proxy did not report one.
///
/// # Errors
/// Returns [`AdapterError::InvalidHeader`] if the target cannot be encoded.
pub fn proxy(podlet: &Podlet, incoming: &Incoming) -> Result<Response<String>, AdapterError> {
    let mut response = Response::new(String::new());
    match &incoming.proxy_target {
        Some(target) => {
            *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
            response
                .headers_mut()
                .insert(LOCATION, header_value("location", target)?);
        }
        None => *response.status_mut() = StatusCode::NO_CONTENT,
    }
    decorate(&mut response, podlet, incoming)?;
    Ok(response)
}

/// The manifest document as JSON
///
/// # Errors
/// Returns [`AdapterError::Manifest`] if encoding fails.
pub fn manifest(podlet: &Podlet) -> Result<Response<String>, AdapterError> {
    let mut response = Response::new(serde_json::to_string(podlet)?);
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers.insert(PODLET_VERSION, header_value(PODLET_VERSION, podlet.version())?);
    Ok(response)
}

/// A plain text response with `status`
#[must_use]
pub fn status(status: StatusCode, body: impl Into<String>) -> Response<String> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
}

/// Turn rejections into responses
///
/// Errors are logged; their messages are not exposed for server errors.
pub async fn recover(rejection: Rejection) -> Result<Response<String>, Infallible> {
    if rejection.is_not_found() {
        return Ok(status(StatusCode::NOT_FOUND, "Not Found"));
    }

    if let Some(PodletRejection(error)) = rejection.find::<PodletRejection>() {
        let code = error.status();
        if code.is_server_error() {
            tracing::error!(%error, "request failed");
            return Ok(status(code, code.canonical_reason().unwrap_or("Error")));
        }
        tracing::debug!(%error, "request rejected");
        return Ok(status(code, error.to_string()));
    }

    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(status(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }

    tracing::error!(?rejection, "unhandled rejection");
    Ok(status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    ))
}
