//! Asset registry
//!
//! Provides [`AssetRegistry`], the append-only, ordered store of a podlet's
//! CSS and JS declarations.

use podlet_schema::{AssetBatch, CssAsset, CssLike, JsAsset, JsLike, Scope, Strategy, ValidationError};

/// Ordered CSS and JS assets of one podlet
///
/// Entries are normalized at insertion and never removed or reordered.
#[derive(Debug, Default, Clone)]
pub struct AssetRegistry {
    css: Vec<CssAsset>,
    js: Vec<JsAsset>,
}

impl AssetRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append CSS assets in call order
    ///
    /// Relative values flagged for prefixing are resolved against `pathname`.
    /// A batch is all-or-nothing: if any entry fails, none is appended.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] in the batch.
    pub fn add_css(
        &mut self,
        batch: impl Into<AssetBatch<CssLike>>,
        pathname: &str,
    ) -> Result<usize, ValidationError> {
        let normalized = batch
            .into()
            .into_inner()
            .into_iter()
            .map(|like| like.normalize(pathname))
            .collect::<Result<Vec<_>, _>>()?;

        let added = normalized.len();
        for asset in &normalized {
            tracing::debug!(value = asset.value(), scope = %asset.scope(), "registered css asset");
        }
        self.css.extend(normalized);
        Ok(added)
    }

    /// Append JS assets in call order
    ///
    /// Same rules as [`AssetRegistry::add_css`]; `data` mappings are turned
    /// into ordered key/value pairs.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] in the batch.
    pub fn add_js(
        &mut self,
        batch: impl Into<AssetBatch<JsLike>>,
        pathname: &str,
    ) -> Result<usize, ValidationError> {
        let normalized = batch
            .into()
            .into_inner()
            .into_iter()
            .map(|like| like.normalize(pathname))
            .collect::<Result<Vec<_>, _>>()?;

        let added = normalized.len();
        for asset in &normalized {
            tracing::debug!(value = asset.value(), scope = %asset.scope(), "registered js asset");
        }
        self.js.extend(normalized);
        Ok(added)
    }

    /// All CSS assets in insertion order
    #[inline]
    #[must_use]
    pub fn css(&self) -> &[CssAsset] {
        &self.css
    }

    /// All JS assets in insertion order
    #[inline]
    #[must_use]
    pub fn js(&self) -> &[JsAsset] {
        &self.js
    }

    /// CSS assets delivered for a request in `scope`
    #[must_use]
    pub fn css_for(&self, scope: Scope) -> Vec<CssAsset> {
        self.css
            .iter()
            .filter(|asset| asset.scope().includes(scope))
            .cloned()
            .collect()
    }

    /// JS assets delivered for a request in `scope`
    #[must_use]
    pub fn js_for(&self, scope: Scope) -> Vec<JsAsset> {
        self.js
            .iter()
            .filter(|asset| asset.scope().includes(scope))
            .cloned()
            .collect()
    }

    /// CSS assets using `strategy`
    pub fn css_with_strategy(&self, strategy: Strategy) -> impl Iterator<Item = &CssAsset> {
        self.css
            .iter()
            .filter(move |asset| asset.strategy() == Some(strategy))
    }

    /// JS assets using `strategy`
    pub fn js_with_strategy(&self, strategy: Strategy) -> impl Iterator<Item = &JsAsset> {
        self.js
            .iter()
            .filter(move |asset| asset.strategy() == Some(strategy))
    }

    /// Total number of assets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.css.len() + self.js.len()
    }

    /// Whether no assets are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}
