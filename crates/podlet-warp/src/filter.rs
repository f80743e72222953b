//! Warp filters
//!
//! [`incoming`] turns a warp request into a processed [`Incoming`];
//! [`manifest`] serves the manifest route.

use crate::error::{AdapterError, PodletRejection};
use crate::reply;
use http::header::HOST;
use http::uri::Authority;
use http::HeaderMap;
use podlet_core::{Incoming, Podlet, ProcessOptions};
use std::convert::Infallible;
use std::sync::Arc;
use url::Url;
use warp::path::FullPath;
use warp::{Filter, Rejection};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Hand the shared podlet to a handler
pub fn with_podlet(
    podlet: Arc<Podlet>,
) -> impl Filter<Extract = (Arc<Podlet>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&podlet))
}

/// Raw query string, empty when the request has none
fn raw_query() -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
}

/// Build and process the [`Incoming`] of every request
///
/// Rejects with [`PodletRejection`] when the request URL cannot be rebuilt or
/// processing fails.
pub fn incoming(
    podlet: Arc<Podlet>,
) -> impl Filter<Extract = (Incoming,), Error = Rejection> + Clone {
    warp::path::full()
        .and(raw_query())
        .and(warp::header::headers_cloned())
        .and(with_podlet(podlet))
        .and_then(process)
}

async fn process(
    path: FullPath,
    query: String,
    headers: HeaderMap,
    podlet: Arc<Podlet>,
) -> Result<Incoming, Rejection> {
    let url = request_url(path.as_str(), &query, &headers).map_err(PodletRejection::reject)?;
    let incoming = Incoming::new(url, headers);

    podlet
        .process(incoming, ProcessOptions::default())
        .await
        .map_err(|e| PodletRejection::reject(AdapterError::Podlet(e)))
}

/// Rebuild the absolute request URL from the `Host` header
///
/// The `Host` value must be a bare authority (`host[:port]`); the path and
/// query always come from the request line. The scheme comes from the first
/// `x-forwarded-proto` entry when it is `https`, otherwise `http`.
///
/// # Errors
/// Returns [`AdapterError::MissingHost`] without a `Host` header,
/// [`AdapterError::InvalidHost`] when it is not a bare authority and
/// [`AdapterError::InvalidUrl`] if the parts do not form a URL.
pub fn request_url(path: &str, query: &str, headers: &HeaderMap) -> Result<Url, AdapterError> {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .ok_or(AdapterError::MissingHost)?;
    let authority: Authority = host.parse().map_err(|_| AdapterError::InvalidHost {
        host: host.to_string(),
    })?;
    if authority.as_str().contains('@') {
        return Err(AdapterError::InvalidHost {
            host: host.to_string(),
        });
    }

    let forwarded = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim);
    let scheme = match forwarded {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    let mut url = Url::parse(&format!("{scheme}://{authority}/"))?;
    url.set_path(path);
    url.set_query((!query.is_empty()).then_some(query));
    Ok(url)
}

/// Serve the manifest document on the podlet's manifest route
pub fn manifest(
    podlet: Arc<Podlet>,
) -> impl Filter<Extract = (http::Response<String>,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path::full())
        .and(with_podlet(podlet))
        .and_then(|path: FullPath, podlet: Arc<Podlet>| async move {
            if path.as_str() == podlet.manifest() {
                reply::manifest(&podlet).map_err(PodletRejection::reject)
            } else {
                Err(warp::reject::not_found())
            }
        })
}
