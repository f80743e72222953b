//! Development server configuration
//!
//! A single TOML file describing the podlet, its assets, proxy targets,
//! default context and the fragments to serve.
//!
//! ```toml
//! [podlet]
//! name = "header"
//! version = "1.0.0"
//! pathname = "/"
//! development = true
//!
//! [[css]]
//! value = "/css/header.css"
//!
//! [[proxy]]
//! name = "api"
//! target = "/api"
//!
//! [defaults]
//! locale = "nb-NO"
//!
//! [pages]
//! content = "<header>Hello</header>"
//! ```

use crate::error::AdapterError;
use podlet_core::{Podlet, PodletOptions};
use podlet_schema::{Context, CssInput, JsInput};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A proxy target entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEntry {
    pub name: String,
    pub target: String,
}

/// Fragments served on the content and fallback routes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub fallback: String,
}

/// Everything needed to run a podlet locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevConfig {
    pub podlet: PodletOptions,
    #[serde(default)]
    pub css: Vec<CssInput>,
    #[serde(default)]
    pub js: Vec<JsInput>,
    #[serde(default)]
    pub proxy: Vec<ProxyEntry>,
    #[serde(default)]
    pub defaults: Option<Context>,
    #[serde(default)]
    pub pages: Pages,
}

impl DevConfig {
    /// Parse from a TOML document
    ///
    /// # Errors
    /// Returns [`AdapterError::Config`] if the document is malformed.
    pub fn from_toml_str(toml: &str) -> Result<Self, AdapterError> {
        toml::from_str(toml).map_err(|e| AdapterError::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`AdapterError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        let toml = std::fs::read_to_string(path)
            .map_err(|e| AdapterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&toml)
    }

    /// Construct and configure the podlet
    ///
    /// # Errors
    /// Returns [`AdapterError::Podlet`] for the first invalid option, asset
    /// or proxy entry.
    pub fn build(&self) -> Result<Podlet, AdapterError> {
        let mut podlet = Podlet::new(self.podlet.clone())?;
        podlet.css(self.css.clone())?;
        podlet.js(self.js.clone())?;
        for entry in &self.proxy {
            podlet.proxy(&entry.target, &entry.name)?;
        }
        if let Some(defaults) = &self.defaults {
            podlet.set_defaults(defaults.clone());
        }
        Ok(podlet)
    }
}
