//! Adapter errors and their HTTP mapping

use http::StatusCode;
use podlet_core::PodletError;

/// Errors raised while serving a podlet through warp
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Request has no usable `Host` header
    #[error("request has no host header")]
    MissingHost,

    /// `Host` header is not a bare `host[:port]` authority
    #[error("invalid host header: {host}")]
    InvalidHost { host: String },

    /// Request parts do not form an absolute URL
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The podlet failed while processing or rendering
    #[error(transparent)]
    Podlet(#[from] PodletError),

    /// A response header value could not be encoded
    #[error("invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    /// The manifest could not be encoded
    #[error("manifest encoding failed: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Development server configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    /// Status code to answer with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHost | Self::InvalidHost { .. } | Self::InvalidUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Podlet(PodletError::Proxy(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Warp rejection carrying an [`AdapterError`]
#[derive(Debug)]
pub struct PodletRejection(pub AdapterError);

impl warp::reject::Reject for PodletRejection {}

impl PodletRejection {
    /// Wrap an error into a warp rejection
    pub fn reject(error: impl Into<AdapterError>) -> warp::Rejection {
        warp::reject::custom(Self(error.into()))
    }
}
