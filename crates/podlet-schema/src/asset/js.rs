//! JS asset declarations
//!
//! Unlike CSS, a JS asset only carries a fixed set of attributes; unknown
//! keys on an input are dropped rather than serialized.

use super::{escape_attr, link_param, Scope, Strategy};
use crate::path::resolve_against;
use crate::validation::{validate_asset_value, validate_attribute_key, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Module format of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsType {
    /// Classic script
    #[default]
    Default,
    /// ES module
    Module,
    /// ES module (legacy name)
    Esm,
    /// CommonJS bundle
    Cjs,
    /// AMD bundle
    Amd,
    /// UMD bundle
    Umd,
}

impl JsType {
    /// Wire name of the type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Module => "module",
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Amd => "amd",
            Self::Umd => "umd",
        }
    }

    /// Whether the script must be loaded with `type="module"`
    #[inline]
    #[must_use]
    pub fn is_module(self) -> bool {
        matches!(self, Self::Module | Self::Esm)
    }
}

/// A `data-*` attribute on a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsData {
    pub key: String,
    pub value: String,
}

impl JsData {
    /// Create a data pair
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A data pair as supplied by a caller; either half may be missing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialJsData {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl From<JsData> for PartialJsData {
    fn from(data: JsData) -> Self {
        Self {
            key: Some(data.key),
            value: Some(data.value),
        }
    }
}

/// `data` as supplied by a caller: a mapping or a list of pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsDataInput {
    /// `{ "key": "value", ... }` in enumeration order
    Map(IndexMap<String, String>),
    /// `[{ "key": .., "value": .. }, ...]`
    Pairs(Vec<PartialJsData>),
}

impl JsDataInput {
    /// Normalize into complete pairs
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidJsData`] for the first pair missing
    /// its key or value.
    pub fn normalize(self) -> Result<Vec<JsData>, ValidationError> {
        match self {
            Self::Map(map) => Ok(map
                .into_iter()
                .map(|(key, value)| JsData { key, value })
                .collect()),
            Self::Pairs(pairs) => pairs
                .into_iter()
                .enumerate()
                .map(|(index, pair)| match (pair.key, pair.value) {
                    (Some(key), Some(value)) => Ok(JsData { key, value }),
                    _ => Err(ValidationError::InvalidJsData { index }),
                })
                .collect(),
        }
    }
}

impl From<IndexMap<String, String>> for JsDataInput {
    fn from(map: IndexMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<JsData>> for JsDataInput {
    fn from(pairs: Vec<JsData>) -> Self {
        Self::Pairs(pairs.into_iter().map(Into::into).collect())
    }
}

/// A normalized JS asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsAsset {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    referrerpolicy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crossorigin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integrity: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    nomodule: bool,
    #[serde(rename = "async", default, skip_serializing_if = "is_false")]
    async_: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    defer: bool,
    #[serde(rename = "type", default)]
    type_: JsType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    data: Vec<JsData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<Strategy>,
    #[serde(default)]
    scope: Scope,
}

impl JsAsset {
    /// Create an asset with default attributes
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            referrerpolicy: None,
            crossorigin: None,
            integrity: None,
            nomodule: false,
            async_: false,
            defer: false,
            type_: JsType::Default,
            data: Vec::new(),
            strategy: None,
            scope: Scope::All,
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

    /// Module format
    #[inline]
    #[must_use]
    pub fn type_(&self) -> JsType {
        self.type_
    }

    /// Data pairs in insertion order
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[JsData] {
        &self.data
    }

    /// Whether the script loads asynchronously
    #[inline]
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.async_
    }

    /// Whether the script is deferred
    #[inline]
    #[must_use]
    pub fn is_defer(&self) -> bool {
        self.defer
    }

    /// Validate the value and the data keys
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingValue`] or
    /// [`ValidationError::InvalidUri`] for field `value`, and
    /// [`ValidationError::InvalidAttribute`] for a data key that is not a
    /// plain token.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_asset_value(&self.value)?;
        for pair in &self.data {
            validate_attribute_key("data", &pair.key)?;
        }
        Ok(())
    }

    /// Render as a `Link` header entry
    ///
    /// Format: `<value>; attr=val; ...; asset-type=script`
    #[must_use]
    pub fn to_link_header(&self) -> String {
        let mut parts = vec![format!("<{}>", self.value)];
        for (key, value) in [
            ("referrerpolicy", &self.referrerpolicy),
            ("crossorigin", &self.crossorigin),
            ("integrity", &self.integrity),
        ] {
            if let Some(v) = value {
                parts.push(link_param(key, v));
            }
        }
        for (flag, set) in [
            ("nomodule", self.nomodule),
            ("async", self.async_),
            ("defer", self.defer),
        ] {
            if set {
                parts.push(format!("{flag}=true"));
            }
        }
        parts.push(format!("type={}", self.type_.as_str()));
        for pair in &self.data {
            parts.push(link_param(&format!("data-{}", pair.key), &pair.value));
        }
        if let Some(s) = self.strategy {
            parts.push(format!("strategy={s}"));
        }
        parts.push(format!("scope={}", self.scope));
        parts.push("asset-type=script".to_string());
        parts.join("; ")
    }

    /// Render as an HTML `<script>` element
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<script src=\"{}\"", escape_attr(&self.value));
        if self.type_.is_module() {
            html.push_str(" type=\"module\"");
        }
        if let Some(v) = &self.referrerpolicy {
            html.push_str(&format!(" referrerpolicy=\"{}\"", escape_attr(v)));
        }
        if let Some(v) = &self.crossorigin {
            html.push_str(&format!(" crossorigin=\"{}\"", escape_attr(v)));
        }
        if let Some(v) = &self.integrity {
            html.push_str(&format!(" integrity=\"{}\"", escape_attr(v)));
        }
        if self.nomodule {
            html.push_str(" nomodule");
        }
        if self.async_ {
            html.push_str(" async");
        }
        if self.defer {
            html.push_str(" defer");
        }
        for pair in &self.data {
            html.push_str(&format!(
                " data-{}=\"{}\"",
                escape_attr(&pair.key),
                escape_attr(&pair.value)
            ));
        }
        html.push_str("></script>");
        html
    }
}

/// Raw JS declaration as handed in by a caller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JsInput {
    pub value: String,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default)]
    pub referrerpolicy: Option<String>,
    #[serde(default)]
    pub crossorigin: Option<String>,
    #[serde(default)]
    pub integrity: Option<String>,
    #[serde(default)]
    pub nomodule: bool,
    #[serde(rename = "async", default)]
    pub async_: bool,
    #[serde(default)]
    pub defer: bool,
    #[serde(rename = "type", default)]
    pub type_: Option<JsType>,
    #[serde(default)]
    pub data: Option<JsDataInput>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub scope: Option<Scope>,
}

impl JsInput {
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

    /// With module format
    #[must_use]
    pub fn with_type(mut self, type_: JsType) -> Self {
        self.type_ = Some(type_);
        self
    }

    /// With `data-*` attributes
    #[must_use]
    pub fn with_data(mut self, data: impl Into<JsDataInput>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Load asynchronously
    #[must_use]
    pub fn with_async(mut self) -> Self {
        self.async_ = true;
        self
    }

    /// Normalize into an asset
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingValue`] or
    /// [`ValidationError::InvalidUri`] for a bad value,
    /// [`ValidationError::InvalidJsData`] for an incomplete data pair and
    /// [`ValidationError::InvalidAttribute`] for a bad data key.
    pub fn normalize(self, pathname: &str) -> Result<JsAsset, ValidationError> {
        validate_asset_value(&self.value)?;
        let data = match self.data {
            Some(data) => data.normalize()?,
            None => Vec::new(),
        };
        let value = if self.prefix {
            resolve_against(pathname, &self.value)
        } else {
            self.value
        };
        let asset = JsAsset {
            value,
            referrerpolicy: self.referrerpolicy,
            crossorigin: self.crossorigin,
            integrity: self.integrity,
            nomodule: self.nomodule,
            async_: self.async_,
            defer: self.defer,
            type_: self.type_.unwrap_or_default(),
            data,
            strategy: self.strategy,
            scope: self.scope.unwrap_or_default(),
        };
        asset.validate()?;
        Ok(asset)
    }
}

impl From<&str> for JsInput {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Either a raw input or an already normalized asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsLike {
    /// Raw declaration, normalized at insertion
    Input(JsInput),
    /// Already normalized, validated at insertion
    Asset(JsAsset),
}

impl JsLike {
    /// Normalize into an asset
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the value or data is not valid.
    pub fn normalize(self, pathname: &str) -> Result<JsAsset, ValidationError> {
        match self {
            Self::Input(input) => input.normalize(pathname),
            Self::Asset(asset) => {
                asset.validate()?;
                Ok(asset)
            }
        }
    }
}

impl From<JsInput> for JsLike {
    fn from(input: JsInput) -> Self {
        Self::Input(input)
    }
}

impl From<JsAsset> for JsLike {
    fn from(asset: JsAsset) -> Self {
        Self::Asset(asset)
    }
}

impl From<&str> for JsLike {
    fn from(value: &str) -> Self {
        Self::Input(JsInput::new(value))
    }
}

impl From<String> for JsLike {
    fn from(value: String) -> Self {
        Self::Input(JsInput::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn data_map_normalized_to_pairs_in_order() {
        let mut map = IndexMap::new();
        map.insert("foo".to_string(), "bar".to_string());
        map.insert("abc".to_string(), "123".to_string());

        let asset = JsInput::new("/a.js").with_data(map).normalize("/").unwrap();
        assert_eq!(
            asset.data(),
            &[JsData::new("foo", "bar"), JsData::new("abc", "123")]
        );
    }

    #[test]
    fn data_pairs_require_key_and_value() {
        let input: JsInput = serde_json::from_str(
            r#"{"value":"/a.js","data":[{"key":"a","value":"1"},{"key":"b"}]}"#,
        )
        .unwrap();
        let err = input.normalize("/").unwrap_err();
        assert_eq!(err, ValidationError::InvalidJsData { index: 1 });
    }

    #[test]
    fn data_map_from_json_object() {
        let input: JsInput =
            serde_json::from_str(r#"{"value":"/a.js","data":{"x":"1","y":"2"}}"#).unwrap();
        let asset = input.normalize("/").unwrap();
        assert_eq!(asset.data().len(), 2);
        assert_eq!(asset.data()[0].key, "x");
    }

    #[test]
    fn unknown_attributes_are_dropped() {
        let input: JsInput =
            serde_json::from_str(r#"{"value":"/a.js","foo":"bar","type":"module"}"#).unwrap();
        let asset = input.normalize("/").unwrap();
        let json = serde_json::to_value(&asset).unwrap();
        assert!(json.get("foo").is_none());
        assert_eq!(json["type"], "module");
    }

    #[test]
    fn prefix_resolves_relative_value() {
        let asset = JsInput::new("a.js").prefixed().normalize("/bar").unwrap();
        assert_eq!(asset.value(), "/bar/a.js");
    }

    #[test]
    fn link_header_format() {
        let asset = JsInput::new("/a.js")
            .with_type(JsType::Module)
            .with_async()
            .with_data(vec![JsData::new("foo", "bar")])
            .normalize("/")
            .unwrap();
        assert_eq!(
            asset.to_link_header(),
            "</a.js>; async=true; type=module; data-foo=bar; scope=all; asset-type=script"
        );
    }

    #[test]
    fn empty_value_rejected() {
        let err = JsInput::new("").normalize("/").unwrap_err();
        assert_eq!(err, ValidationError::MissingValue { field: "value" });
    }

    #[test]
    fn data_values_cannot_split_the_link_entry() {
        let asset = JsInput::new("/a.js")
            .with_data(vec![JsData::new("foo", "a, </evil.js>; asset-type=script")])
            .normalize("/")
            .unwrap();
        let header = asset.to_link_header();
        assert_eq!(
            header,
            "</a.js>; type=default; data-foo=\"a, </evil.js>; asset-type=script\"; \
             scope=all; asset-type=script"
        );
        assert!(header.starts_with("</a.js>"));
    }

    #[test]
    fn data_keys_must_be_tokens() {
        let err = JsInput::new("/a.js")
            .with_data(vec![JsData::new("a; b", "1")])
            .normalize("/")
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidAttribute {
                field: "data",
                key: "a; b".to_string()
            }
        );
    }

    #[test]
    fn html_rendering() {
        let asset = JsInput::new("/a.js")
            .with_type(JsType::Esm)
            .with_data(vec![JsData::new("foo", "bar")])
            .normalize("/")
            .unwrap();
        assert_eq!(
            asset.to_html(),
            "<script src=\"/a.js\" type=\"module\" data-foo=\"bar\"></script>"
        );
    }
}
