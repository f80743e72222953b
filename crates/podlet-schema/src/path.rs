//! Pathname helpers
//!
//! Joining of mount paths with route segments and the relative/absolute
//! distinction used when prefixing routes and asset values.

/// Join path segments with exactly one `/` between each pair
///
/// Empty segments are skipped, so an unset fallback or an empty prefix never
/// produces a doubled slash.
///
/// # Examples
/// ```
/// use podlet_schema::pathname_builder;
///
/// assert_eq!(pathname_builder(["/", "/podium-resource", "foo"]), "/podium-resource/foo");
/// assert_eq!(pathname_builder(["/bar", "/"]), "/bar/");
/// assert_eq!(pathname_builder(["/bar", "manifest.json"]), "/bar/manifest.json");
/// ```
#[must_use]
pub fn pathname_builder<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments.into_iter().fold(String::new(), |mut acc, segment| {
        let segment = segment.as_ref();
        if segment.is_empty() {
            return acc;
        }
        let acc_slash = acc.ends_with('/');
        let seg_slash = segment.starts_with('/');
        if acc.is_empty() || (acc_slash != seg_slash) {
            acc.push_str(segment);
        } else if acc_slash && seg_slash {
            acc.push_str(&segment[1..]);
        } else {
            acc.push('/');
            acc.push_str(segment);
        }
        acc
    })
}

/// Check whether a URI is relative (has no scheme and host)
///
/// Absolute URIs pass through prefixing untouched.
#[inline]
#[must_use]
pub fn uri_is_relative(uri: &str) -> bool {
    !url::Url::parse(uri).is_ok_and(|parsed| parsed.has_host())
}

/// Resolve a route or asset value against a mount pathname
///
/// Relative values are joined onto `pathname`; absolute URIs and empty
/// values are returned unchanged.
#[must_use]
pub fn resolve_against(pathname: &str, uri: &str) -> String {
    if uri.is_empty() || !uri_is_relative(uri) {
        return uri.to_string();
    }
    pathname_builder([pathname, uri])
}
