//! Error types for Podlet Core
//!
//! Two families of failure:
//! - Configuration errors, raised while constructing or configuring a
//!   podlet; fatal, the application must fix its setup
//! - Request-time errors, raised from `process`; the adapter decides how to
//!   answer the request

use podlet_schema::{ManifestError, ValidationError};

/// Main podlet error type
#[derive(Debug, thiserror::Error)]
pub enum PodletError {
    /// A name, version, route, asset or proxy value failed validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// More proxy targets than allowed
    #[error("one can not define more than {max} proxy targets for each podlet")]
    ProxyCapacity { max: usize },

    /// Podlet name cannot be used as a custom element
    #[error("when using the shadow DOM wrapper, podlet name \"{name}\" must be lowercase, start with a letter and contain a hyphen")]
    ShadowDomName { name: String },

    /// Options could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Manifest could not be produced or read
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Proxy collaborator failed while processing a request
    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),
}

impl PodletError {
    /// Whether the error stems from configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !self.is_request_time()
    }

    /// Whether the error was raised while processing a request
    #[inline]
    #[must_use]
    pub fn is_request_time(&self) -> bool {
        matches!(self, Self::Proxy(_))
    }
}

/// Errors reported by a proxy collaborator
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Target could not be reached
    #[error("proxy target unreachable: {0}")]
    Unreachable(String),

    /// Target resolved but the request could not be built
    #[error("invalid proxy target: {0}")]
    InvalidTarget(String),

    /// Any other collaborator failure
    #[error("proxy failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_field_and_value() {
        let err = PodletError::from(ValidationError::InvalidName {
            field: "name",
            value: "foo bar".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("name"));
        assert!(msg.contains("foo bar"));
        assert!(err.is_configuration());
    }

    #[test]
    fn proxy_errors_are_request_time() {
        let err = PodletError::from(ProxyError::Unreachable("http://x".to_string()));
        assert!(err.is_request_time());
        assert!(!err.is_configuration());
    }

    #[test]
    fn capacity_message() {
        let err = PodletError::ProxyCapacity { max: 4 };
        assert!(err.to_string().contains("more than 4"));
    }
}
