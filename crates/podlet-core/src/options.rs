//! Podlet configuration
//!
//! Options are plain data, loadable from TOML or JSON. Nothing is validated
//! here; [`crate::Podlet::new`] validates on construction.

use crate::error::PodletError;
use serde::{Deserialize, Serialize};

fn default_manifest() -> String {
    "/manifest.json".to_string()
}

fn default_content() -> String {
    "/".to_string()
}

fn default_prefix() -> String {
    "/podium-resource".to_string()
}

/// Podlet construction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodletOptions {
    /// Unique podlet identifier
    pub name: String,
    /// Opaque version identifier
    pub version: String,
    /// Mount path of the podlet
    pub pathname: String,
    /// Manifest route, relative to `pathname`
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Content route, relative to `pathname`
    #[serde(default = "default_content")]
    pub content: String,
    /// Fallback route, empty for none
    #[serde(default)]
    pub fallback: String,
    /// Development mode
    #[serde(default)]
    pub development: bool,
    /// Wrap rendered fragments in a declarative shadow root
    #[serde(default, rename = "useShadowDOM")]
    pub use_shadow_dom: bool,
    /// Proxy mount options
    #[serde(default)]
    pub proxy: ProxyOptions,
}

impl PodletOptions {
    /// Options with required fields and defaults for the rest
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        pathname: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            pathname: pathname.into(),
            manifest: default_manifest(),
            content: default_content(),
            fallback: String::new(),
            development: false,
            use_shadow_dom: false,
            proxy: ProxyOptions::default(),
        }
    }

    /// With manifest route
    #[inline]
    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// With content route
    #[inline]
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// With fallback route
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// With development mode
    #[inline]
    #[must_use]
    pub fn with_development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// With the shadow DOM wrapper enabled
    #[inline]
    #[must_use]
    pub fn with_shadow_dom(mut self, use_shadow_dom: bool) -> Self {
        self.use_shadow_dom = use_shadow_dom;
        self
    }

    /// With proxy mount options
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyOptions) -> Self {
        self.proxy = proxy;
        self
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// Returns [`PodletError::Config`] if the document is malformed or a field
    /// has the wrong type.
    pub fn from_toml_str(toml: &str) -> Result<Self, PodletError> {
        toml::from_str(toml).map_err(|e| PodletError::Config(e.to_string()))
    }

    /// Parse from a JSON document
    ///
    /// # Errors
    /// Returns [`PodletError::Config`] if the document is malformed or a field
    /// has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, PodletError> {
        serde_json::from_str(json).map_err(|e| PodletError::Config(e.to_string()))
    }
}

/// Where the proxy collaborator is mounted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOptions {
    /// Proxy mount path; the podlet pathname when unset
    #[serde(default)]
    pub pathname: Option<String>,
    /// Path segment all proxied routes live under
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            pathname: None,
            prefix: default_prefix(),
        }
    }
}

/// Whether a route accessor returns the mounted or the raw route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    /// Prefix the route with the podlet pathname
    pub prefix: bool,
}

impl RouteOptions {
    /// Raw route, as configured
    #[inline]
    #[must_use]
    pub fn unprefixed() -> Self {
        Self { prefix: false }
    }
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self { prefix: true }
    }
}

/// Per-call options for [`crate::Podlet::process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Allow delegation to the proxy collaborator in development mode
    pub proxy: bool,
}

impl ProcessOptions {
    /// Skip the proxy collaborator
    #[inline]
    #[must_use]
    pub fn without_proxy() -> Self {
        Self { proxy: false }
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { proxy: true }
    }
}
