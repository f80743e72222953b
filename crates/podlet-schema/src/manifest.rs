//! Manifest document
//!
//! The JSON description a podlet serves at its manifest route and a layout
//! reads to find content, fallback, assets and proxy targets.

use crate::asset::{CssAsset, JsAsset};
use crate::validation::{validate_name, validate_uri, validate_version, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialized podlet description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub content: String,
    #[serde(default)]
    pub fallback: String,
    #[serde(default)]
    pub css: Vec<CssAsset>,
    #[serde(default)]
    pub js: Vec<JsAsset>,
    #[serde(default)]
    pub proxy: IndexMap<String, String>,
}

impl Manifest {
    /// Parse and validate a manifest document
    ///
    /// # Errors
    /// Returns [`ManifestError::Json`] for malformed JSON and
    /// [`ManifestError::Invalid`] when a field fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serialize to a JSON string
    ///
    /// # Errors
    /// Returns [`ManifestError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate every field the layout depends on
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        validate_version(&self.version)?;
        validate_uri("content", &self.content)?;
        validate_uri("fallback", &self.fallback)?;
        for asset in &self.css {
            asset.validate()?;
        }
        for asset in &self.js {
            asset.validate()?;
        }
        for (name, target) in &self.proxy {
            validate_name("name", name)?;
            validate_uri("target", target)?;
        }
        Ok(())
    }
}

/// Errors reading a manifest document
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Document is not valid JSON or has the wrong shape
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// A field failed validation
    #[error("invalid manifest: {0}")]
    Invalid(#[from] ValidationError),
}
