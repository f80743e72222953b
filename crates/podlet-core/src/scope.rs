//! Request scope classification
//!
//! Decides whether a request path targets the fallback route, the content
//! route, or neither. Routes are compared in their mounted form.

use podlet_schema::Scope;

/// Classify a request path
///
/// The fallback is checked first and needs an exact match; the content route
/// matches by prefix since it may be followed by dynamic segments. An empty
/// or absent fallback never matches.
#[must_use]
pub fn classify(request_path: &str, content: &str, fallback: Option<&str>) -> Scope {
    if let Some(fallback) = fallback.filter(|f| !f.is_empty()) {
        if request_path == fallback {
            return Scope::Fallback;
        }
    }
    if request_path.starts_with(content) {
        return Scope::Content;
    }
    Scope::All
}
