//! CSS asset declarations

use super::{escape_attr, link_param, Scope, Strategy};
use crate::path::resolve_against;
use crate::validation::{validate_asset_value, validate_attribute_key, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// String-valued link attributes with a field of their own
const TYPED: &[&str] = &["crossorigin", "hreflang", "title", "media", "as", "type", "rel"];

/// Keys a free-form attribute may not take
///
/// Known fields, plus the names the `Link` and `<link>` renderings emit
/// themselves.
const RESERVED: &[&str] = &[
    "value",
    "prefix",
    "href",
    "crossorigin",
    "disabled",
    "hreflang",
    "title",
    "media",
    "as",
    "type",
    "rel",
    "strategy",
    "scope",
    "asset-type",
];

fn default_type() -> String {
    "text/css".to_string()
}

fn default_rel() -> String {
    "stylesheet".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A normalized CSS asset
///
/// Known link attributes are typed; any further attributes are kept verbatim
/// in insertion order and serialized alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssAsset {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crossorigin: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hreflang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media: Option<String>,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    as_: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    type_: String,
    #[serde(default = "default_rel")]
    rel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<Strategy>,
    #[serde(default)]
    scope: Scope,
    #[serde(flatten)]
    attributes: IndexMap<String, String>,
}

impl CssAsset {
    /// Create an asset with default attributes
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            crossorigin: None,
            disabled: false,
            hreflang: None,
            title: None,
            media: None,
            as_: None,
            type_: default_type(),
            rel: default_rel(),
            strategy: None,
            scope: Scope::All,
            attributes: IndexMap::new(),
        }
    }

    /// Asset location
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Route scope
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Loading strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Media query
    #[inline]
    #[must_use]
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    /// MIME type, `text/css` unless overridden
    #[inline]
    #[must_use]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Link relation, `stylesheet` unless overridden
    #[inline]
    #[must_use]
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// Free-form attributes beyond the known set
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Validate the value and the free-form attribute keys
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingValue`] or
    /// [`ValidationError::InvalidUri`] for field `value`,
    /// [`ValidationError::ReservedAttribute`] for a free-form key that
    /// shadows a known field, and [`ValidationError::InvalidAttribute`] for
    /// a key that is not a plain token.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_asset_value(&self.value)?;
        for key in self.attributes.keys() {
            if RESERVED.contains(&key.as_str()) {
                return Err(ValidationError::ReservedAttribute { key: key.clone() });
            }
            validate_attribute_key("attributes", key)?;
        }
        Ok(())
    }

    /// Attribute pairs in serialization order, excluding `value`
    fn attribute_pairs(&self) -> Vec<(&str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.crossorigin {
            pairs.push(("crossorigin", v.clone()));
        }
        if self.disabled {
            pairs.push(("disabled", "true".to_string()));
        }
        if let Some(v) = &self.hreflang {
            pairs.push(("hreflang", v.clone()));
        }
        if let Some(v) = &self.title {
            pairs.push(("title", v.clone()));
        }
        if let Some(v) = &self.media {
            pairs.push(("media", v.clone()));
        }
        if let Some(v) = &self.as_ {
            pairs.push(("as", v.clone()));
        }
        pairs.push(("type", self.type_.clone()));
        pairs.push(("rel", self.rel.clone()));
        if let Some(s) = self.strategy {
            pairs.push(("strategy", s.as_str().to_string()));
        }
        pairs.push(("scope", self.scope.as_str().to_string()));
        for (k, v) in &self.attributes {
            pairs.push((k.as_str(), v.clone()));
        }
        pairs
    }

    /// Render as a `Link` header entry
    ///
    /// Format: `<value>; attr=val; ...; asset-type=style`
    #[must_use]
    pub fn to_link_header(&self) -> String {
        let mut parts = vec![format!("<{}>", self.value)];
        parts.extend(
            self.attribute_pairs()
                .into_iter()
                .map(|(k, v)| link_param(k, &v)),
        );
        parts.push("asset-type=style".to_string());
        parts.join("; ")
    }

    /// Render as an HTML `<link>` element
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<link href=\"{}\"", escape_attr(&self.value));
        for (key, value) in self.attribute_pairs() {
            match key {
                "strategy" | "scope" => {}
                "disabled" => html.push_str(" disabled"),
                _ => html.push_str(&format!(" {key}=\"{}\"", escape_attr(&value))),
            }
        }
        html.push('>');
        html
    }
}

/// Raw CSS declaration as handed in by a caller
///
/// `prefix` asks for a relative `value` to be resolved against the podlet
/// mount pathname at insertion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CssInput {
    pub value: String,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default)]
    pub crossorigin: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub hreflang: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(rename = "as", default)]
    pub as_: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, String>,
}

impl CssInput {
    /// Input with only a value
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Resolve a relative value against the mount pathname
    #[must_use]
    pub fn prefixed(mut self) -> Self {
        self.prefix = true;
        self
    }

    /// With route scope
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// With loading strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// With media query
    #[must_use]
    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    /// With a free-form attribute
    ///
    /// A key naming one of the typed link attributes (`media`, `type`,
    /// `rel`, ...) sets that field instead.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        match self.typed_slot(&key) {
            Some(slot) => *slot = Some(value.into()),
            None => {
                self.attributes.insert(key, value.into());
            }
        }
        self
    }

    fn typed_slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "crossorigin" => Some(&mut self.crossorigin),
            "hreflang" => Some(&mut self.hreflang),
            "title" => Some(&mut self.title),
            "media" => Some(&mut self.media),
            "as" => Some(&mut self.as_),
            "type" => Some(&mut self.type_),
            "rel" => Some(&mut self.rel),
            _ => None,
        }
    }

    /// Normalize into an asset
    ///
    /// Free-form attributes naming a typed link attribute fill that field
    /// when it is unset and are dropped otherwise.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingValue`] for an empty value,
    /// [`ValidationError::InvalidUri`] if the value is not a valid URI, and
    /// [`ValidationError::ReservedAttribute`] or
    /// [`ValidationError::InvalidAttribute`] for a bad free-form key.
    pub fn normalize(mut self, pathname: &str) -> Result<CssAsset, ValidationError> {
        validate_asset_value(&self.value)?;
        for key in TYPED {
            if let Some(value) = self.attributes.shift_remove(*key) {
                if let Some(slot) = self.typed_slot(key) {
                    slot.get_or_insert(value);
                }
            }
        }

        let value = if self.prefix {
            resolve_against(pathname, &self.value)
        } else {
            self.value
        };
        let asset = CssAsset {
            value,
            crossorigin: self.crossorigin,
            disabled: self.disabled,
            hreflang: self.hreflang,
            title: self.title,
            media: self.media,
            as_: self.as_,
            type_: self.type_.unwrap_or_else(default_type),
            rel: self.rel.unwrap_or_else(default_rel),
            strategy: self.strategy,
            scope: self.scope.unwrap_or_default(),
            attributes: self.attributes,
        };
        asset.validate()?;
        Ok(asset)
    }
}

impl From<&str> for CssInput {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Either a raw input or an already normalized asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssLike {
    /// Raw declaration, normalized at insertion
    Input(CssInput),
    /// Already normalized, validated at insertion
    Asset(CssAsset),
}

impl CssLike {
    /// Normalize into an asset
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidUri`] if the value is not valid.
    pub fn normalize(self, pathname: &str) -> Result<CssAsset, ValidationError> {
        match self {
            Self::Input(input) => input.normalize(pathname),
            Self::Asset(asset) => {
                asset.validate()?;
                Ok(asset)
            }
        }
    }
}

impl From<CssInput> for CssLike {
    fn from(input: CssInput) -> Self {
        Self::Input(input)
    }
}

impl From<CssAsset> for CssLike {
    fn from(asset: CssAsset) -> Self {
        Self::Asset(asset)
    }
}

impl From<&str> for CssLike {
    fn from(value: &str) -> Self {
        Self::Input(CssInput::new(value))
    }
}

impl From<String> for CssLike {
    fn from(value: String) -> Self {
        Self::Input(CssInput::new(value))
    }
}
