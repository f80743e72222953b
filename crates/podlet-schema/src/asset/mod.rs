//! Asset value objects
//!
//! A podlet declares the CSS and JS it depends on as ordered lists of assets.
//! Callers hand in raw inputs ([`CssInput`], [`JsInput`]) or already
//! normalized assets ([`CssAsset`], [`JsAsset`]); normalization resolves
//! prefixed relative values, applies defaults and validates the value.

mod css;
mod js;

pub use css::{CssAsset, CssInput, CssLike};
pub use js::{JsAsset, JsData, JsDataInput, JsInput, JsLike, JsType, PartialJsData};

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Route scope of a request or of an asset
///
/// Assets scoped to [`Scope::All`] are delivered on every route; a request
/// classified as [`Scope::All`] receives every asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Content route only
    Content,
    /// Fallback route only
    Fallback,
    /// Every route
    #[default]
    All,
}

impl Scope {
    /// Whether an asset with this scope is delivered for a request in `request`
    #[inline]
    #[must_use]
    pub fn includes(self, request: Scope) -> bool {
        self == Scope::All || request == Scope::All || self == request
    }

    /// Wire name of the scope
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Fallback => "fallback",
            Self::All => "all",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loading strategy hint for an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Load before the page becomes interactive
    #[serde(rename = "beforeInteractive")]
    BeforeInteractive,
    /// Load after the page becomes interactive
    #[serde(rename = "afterInteractive")]
    AfterInteractive,
    /// Load when idle
    #[serde(rename = "lazy")]
    Lazy,
    /// Embed inside the podlet's shadow root
    #[serde(rename = "shadow-dom")]
    ShadowDom,
}

impl Strategy {
    /// Wire name of the strategy
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeInteractive => "beforeInteractive",
            Self::AfterInteractive => "afterInteractive",
            Self::Lazy => "lazy",
            Self::ShadowDom => "shadow-dom",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or many asset declarations handed to a single registry call
///
/// Built through `From` so that `podlet.css("/a.css")`,
/// `podlet.css(CssInput::new("/a.css"))` and `podlet.css(vec![...])`
/// all go through the same entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBatch<T>(Vec<T>);

impl<T> AssetBatch<T> {
    /// Entries in call order
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

macro_rules! batch_from {
    ($like:ty: $($single:ty),+) => {
        $(
            impl From<$single> for AssetBatch<$like> {
                fn from(value: $single) -> Self {
                    Self(vec![value.into()])
                }
            }
        )+

        impl<T: Into<$like>> From<Vec<T>> for AssetBatch<$like> {
            fn from(values: Vec<T>) -> Self {
                Self(values.into_iter().map(Into::into).collect())
            }
        }

        impl<T: Into<$like>, const N: usize> From<[T; N]> for AssetBatch<$like> {
            fn from(values: [T; N]) -> Self {
                Self(values.into_iter().map(Into::into).collect())
            }
        }
    };
}

batch_from!(CssLike: &str, String, CssInput, CssAsset, CssLike);
batch_from!(JsLike: &str, String, JsInput, JsAsset, JsLike);

/// Write one `key=value` parameter of a `Link` header entry
///
/// Values that could end the parameter or the entry (`;`, `,`, quotes,
/// backslashes, whitespace) are written as a quoted string.
pub(crate) fn link_param(key: &str, value: &str) -> String {
    let plain = !value.is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, ';' | ',' | '"' | '\\') || c.is_whitespace() || c.is_control());
    if plain {
        return format!("{key}={value}");
    }

    let mut out = String::with_capacity(key.len() + value.len() + 3);
    out.push_str(key);
    out.push_str("=\"");
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Escape a value for HTML text or a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_inclusion() {
        assert!(Scope::All.includes(Scope::Content));
        assert!(Scope::Content.includes(Scope::All));
        assert!(Scope::Content.includes(Scope::Content));
        assert!(!Scope::Content.includes(Scope::Fallback));
        assert!(!Scope::Fallback.includes(Scope::Content));
    }

    #[test]
    fn scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Fallback).unwrap(), "\"fallback\"");
        let scope: Scope = serde_json::from_str("\"content\"").unwrap();
        assert_eq!(scope, Scope::Content);
    }

    #[test]
    fn strategy_wire_names() {
        assert_eq!(
            serde_json::to_string(&Strategy::ShadowDom).unwrap(),
            "\"shadow-dom\""
        );
        let s: Strategy = serde_json::from_str("\"afterInteractive\"").unwrap();
        assert_eq!(s, Strategy::AfterInteractive);
    }

    #[test]
    fn batch_from_single_and_many() {
        let single: AssetBatch<CssLike> = "/a.css".into();
        assert_eq!(single.len(), 1);

        let many: AssetBatch<JsLike> = vec!["/a.js", "/b.js"].into();
        assert_eq!(many.len(), 2);

        let array: AssetBatch<CssLike> = [CssInput::new("/a.css"), CssInput::new("/b.css")].into();
        assert_eq!(array.into_inner().len(), 2);
    }

    #[test]
    fn link_params_quote_separators() {
        assert_eq!(link_param("media", "print"), "media=print");
        assert_eq!(link_param("type", "text/css"), "type=text/css");
        assert_eq!(
            link_param("media", "screen, print"),
            "media=\"screen, print\""
        );
        assert_eq!(link_param("data-x", "a;b"), "data-x=\"a;b\"");
        assert_eq!(link_param("title", "say \"hi\""), "title=\"say \\\"hi\\\"\"");
        assert_eq!(link_param("title", ""), "title=\"\"");
    }

    #[test]
    fn escape_attr_quotes() {
        assert_eq!(escape_attr("a\"b<c>&"), "a&quot;b&lt;c&gt;&amp;");
    }
}
