//! Per-request state
//!
//! An [`Incoming`] is built by a framework adapter for every request, filled
//! in by [`crate::Podlet::process`] and dropped when the response is done.

use http::header::{HeaderMap, USER_AGENT};
use podlet_schema::{Context, CssAsset, JsAsset};
use url::Url;

/// User agent prefix sent by the layout's HTTP client
pub const LAYOUT_USER_AGENT: &str = "@podium/client";

/// Request as seen by a podlet
#[derive(Debug, Clone)]
pub struct Incoming {
    url: Url,
    headers: HeaderMap,
    /// Name of the podlet that processed the request
    pub name: String,
    /// CSS assets for the request's scope
    pub css: Vec<CssAsset>,
    /// JS assets for the request's scope
    pub js: Vec<JsAsset>,
    /// Whether development behavior applies to this request
    pub development: bool,
    /// Effective request context
    pub context: Context,
    /// Set when the proxy collaborator took over the request
    pub proxy: bool,
    /// Resolved destination when the proxy took over
    pub proxy_target: Option<String>,
}

impl Incoming {
    /// Create from a parsed URL and request headers
    #[must_use]
    pub fn new(url: Url, headers: HeaderMap) -> Self {
        Self {
            url,
            headers,
            name: String::new(),
            css: Vec::new(),
            js: Vec::new(),
            development: false,
            context: Context::new(),
            proxy: false,
            proxy_target: None,
        }
    }

    /// Create from an absolute URL string
    ///
    /// # Errors
    /// Returns the parse error if `url` is not an absolute URL.
    pub fn parse(url: &str, headers: HeaderMap) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?, headers))
    }

    /// Full request URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request path
    #[inline]
    #[must_use]
    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// Request origin, e.g. `http://localhost:7100`
    #[inline]
    #[must_use]
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Request headers
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the request was made by the layout's client
    #[must_use]
    pub fn is_from_layout(&self) -> bool {
        self.headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|agent| agent.starts_with(LAYOUT_USER_AGENT))
    }

    /// `Link` header value for the request's assets
    ///
    /// JS entries first, then CSS, comma separated. Empty when there are no
    /// assets.
    #[must_use]
    pub fn link_header(&self) -> String {
        self.js
            .iter()
            .map(JsAsset::to_link_header)
            .chain(self.css.iter().map(CssAsset::to_link_header))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
