//! Request context
//!
//! A flat string map describing how and where a podlet is being displayed.
//! The layout transports it as `podium-*` request headers.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Header prefix used by the layout to transport context values
pub const HEADER_PREFIX: &str = "podium-";

/// Required context keys
pub mod keys {
    pub const DEBUG: &str = "debug";
    pub const LOCALE: &str = "locale";
    pub const DEVICE_TYPE: &str = "deviceType";
    pub const REQUESTED_BY: &str = "requestedBy";
    pub const MOUNT_ORIGIN: &str = "mountOrigin";
    pub const MOUNT_PATHNAME: &str = "mountPathname";
    pub const PUBLIC_PATHNAME: &str = "publicPathname";

    /// All required keys in canonical order
    pub const REQUIRED: [&str; 7] = [
        DEBUG,
        LOCALE,
        DEVICE_TYPE,
        REQUESTED_BY,
        MOUNT_ORIGIN,
        MOUNT_PATHNAME,
        PUBLIC_PATHNAME,
    ];
}

/// Flat request context, insertion ordered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(IndexMap<String, String>);

impl Context {
    /// Create an empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a value, replacing any previous one in place
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a value, builder style
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Whether a key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layer `other` on top of `self`; keys in `other` win
    #[must_use]
    pub fn overlay(&self, other: &Context) -> Context {
        let mut merged = self.clone();
        for (k, v) in &other.0 {
            merged.0.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Required keys missing from this context
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        keys::REQUIRED
            .into_iter()
            .filter(|key| !self.contains_key(key))
            .collect()
    }

    /// Read every `podium-*` header into a context
    ///
    /// `podium-device-type` becomes `deviceType`. Values that are not valid
    /// visible ASCII are skipped.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut context = Self::new();
        for (name, value) in headers {
            let Some(rest) = name.as_str().strip_prefix(HEADER_PREFIX) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match value.to_str() {
                Ok(value) => context.insert(kebab_to_camel(rest), value),
                Err(_) => tracing::debug!(header = %name, "skipping non-ascii context header"),
            }
        }
        context
    }

    /// Write the context as `podium-*` headers
    ///
    /// Entries whose key or value cannot form a header are skipped.
    #[must_use]
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (key, value) in self.iter() {
            let name = format!("{HEADER_PREFIX}{}", camel_to_kebab(key));
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::debug!(key, "skipping context entry not representable as header"),
            }
        }
        headers
    }
}

impl FromIterator<(String, String)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Context {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

fn kebab_to_camel(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut upper = false;
    for c in value.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn camel_to_kebab(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
