//! Validation for podlet identity and route values
//!
//! Pure predicates over strings plus `validate_*` wrappers that turn a failed
//! predicate into a [`ValidationError`] naming the offending field and value.

use once_cell::sync::Lazy;
use regex::Regex;

/// Identifier rule for podlet and proxy names
static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-zA-Z0-9_-]*$").expect("name pattern is valid"));

/// Token rule for free-form asset attribute and data keys
static ATTRIBUTE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.:-]*$").expect("attribute key pattern is valid")
});

/// Custom element rule: lowercase, starts with a letter, contains a hyphen
static CUSTOM_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)+$").expect("custom element pattern is valid")
});

/// RFC 3986 character repertoire with well-formed percent escapes
static URI_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=]|%[0-9A-Fa-f]{2})*$")
        .expect("uri pattern is valid")
});

/// Scheme prefix, e.g. `https:`
static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").expect("scheme pattern is valid"));

/// Check that a name is a non-empty identifier
///
/// Letters, digits, `_` and `-`, starting with a lowercase letter. No
/// whitespace.
#[inline]
#[must_use]
pub fn is_valid_name(value: &str) -> bool {
    NAME.is_match(value)
}

/// Check that a version is a non-empty, non-blank string
#[inline]
#[must_use]
pub fn is_valid_version(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Check that a value is empty or a syntactically valid URI reference
///
/// Relative references (`/foo/bar`, `foo`, `../a`) and absolute URIs
/// (`https://cdn.example.com/a.js`) pass. Whitespace and raw non-ASCII
/// characters fail.
#[must_use]
pub fn is_valid_uri(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if !URI_CHARS.is_match(value) {
        return false;
    }
    if SCHEME.is_match(value) {
        return url::Url::parse(value).is_ok();
    }
    true
}

/// Check that an attribute key is a plain token
///
/// Keys end up as `Link` parameter names and HTML attribute names, so
/// separators, quotes and whitespace are refused.
#[inline]
#[must_use]
pub fn is_valid_attribute_key(value: &str) -> bool {
    ATTRIBUTE_KEY.is_match(value)
}

/// Check that a name can be used as a custom element tag
#[inline]
#[must_use]
pub fn is_custom_element_name(value: &str) -> bool {
    CUSTOM_ELEMENT.is_match(value)
}

/// Validate an identifier field
///
/// # Errors
/// Returns [`ValidationError::InvalidName`] naming `field` and the value.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_name(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}

/// Validate a version field
///
/// # Errors
/// Returns [`ValidationError::InvalidVersion`] if the value is blank.
pub fn validate_version(value: &str) -> Result<(), ValidationError> {
    if is_valid_version(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidVersion {
            value: value.to_string(),
        })
    }
}

/// Validate a URI field
///
/// # Errors
/// Returns [`ValidationError::InvalidUri`] naming `field` and the value.
pub fn validate_uri(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_valid_uri(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUri {
            field,
            value: value.to_string(),
        })
    }
}

/// Validate a required asset value: non-empty and a valid URI
///
/// # Errors
/// Returns [`ValidationError::MissingValue`] for an empty value and
/// [`ValidationError::InvalidUri`] for field `value` otherwise.
pub fn validate_asset_value(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingValue { field: "value" });
    }
    validate_uri("value", value)
}

/// Validate an attribute or data key
///
/// # Errors
/// Returns [`ValidationError::InvalidAttribute`] naming `field` and the key.
pub fn validate_attribute_key(field: &'static str, key: &str) -> Result<(), ValidationError> {
    if is_valid_attribute_key(key) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAttribute {
            field,
            key: key.to_string(),
        })
    }
}

/// Validate a mount pathname: non-empty, and either `/` or an absolute path
///
/// # Errors
/// Returns [`ValidationError::InvalidUri`] for field `pathname`.
pub fn validate_pathname(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.starts_with('/') && is_valid_uri(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUri {
            field: "pathname",
            value: value.to_string(),
        })
    }
}

/// Validation errors with the offending field and value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Identifier does not match the naming rule
    #[error("the value, \"{value}\", for the required argument \"{field}\" is not defined or not valid")]
    InvalidName { field: &'static str, value: String },

    /// Version is empty or blank
    #[error("the value, \"{value}\", for the required argument \"version\" is not defined or not valid")]
    InvalidVersion { value: String },

    /// Value is not a valid URI reference
    #[error("the value, \"{value}\", for the argument \"{field}\" is not a valid uri")]
    InvalidUri { field: &'static str, value: String },

    /// A `data` pair on a js asset lacks a key or a value
    #[error("js asset data entry at index {index} must have both \"key\" and \"value\"")]
    InvalidJsData { index: usize },

    /// A required value is empty
    #[error("the required argument \"{field}\" is not defined")]
    MissingValue { field: &'static str },

    /// An attribute key is not a plain token
    #[error("the key, \"{key}\", in \"{field}\" is not a valid attribute name")]
    InvalidAttribute { field: &'static str, key: String },

    /// A free-form attribute shadows a known asset field
    #[error("the attribute \"{key}\" is reserved and must be set through its own field")]
    ReservedAttribute { key: String },
}

impl ValidationError {
    /// Name of the field that failed validation
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidName { field, .. }
            | Self::InvalidUri { field, .. }
            | Self::MissingValue { field }
            | Self::InvalidAttribute { field, .. } => field,
            Self::InvalidVersion { .. } => "version",
            Self::InvalidJsData { .. } => "data",
            Self::ReservedAttribute { .. } => "attributes",
        }
    }
}
