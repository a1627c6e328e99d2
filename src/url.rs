//! URL model (C1): parsing, normalization, and classification of references
//! as they appear inside an EPUB container.
//!
//! None of these functions raise errors. A malformed URL is returned as-is so
//! that later rules (the reference validator, §4.7) can classify the failure
//! with a proper diagnostic rather than this layer guessing at intent.

use percent_encoding::percent_decode_str;
use unicode_normalization::UnicodeNormalization;

/// A URL split into its resource part and optional fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// The resource portion, percent-decoded where that decode is valid UTF-8.
    pub resource: String,
    pub fragment: Option<String>,
    pub has_fragment: bool,
}

/// Percent-decodes safely and splits off a trailing `#fragment`.
///
/// Invalid percent-encoding or non-UTF-8 decode output is left untouched —
/// the raw substring is used verbatim rather than lossily repaired, so later
/// layers can still detect and report the malformed form.
///
/// # Examples
///
/// ```
/// use epubcheck_core::url::parse_url;
///
/// let parsed = parse_url("images/cover.png");
/// assert_eq!(parsed.resource, "images/cover.png");
/// assert!(!parsed.has_fragment);
///
/// let parsed = parse_url("ch1.xhtml#section-2");
/// assert_eq!(parsed.resource, "ch1.xhtml");
/// assert_eq!(parsed.fragment.as_deref(), Some("section-2"));
/// ```
#[must_use]
pub fn parse_url(u: &str) -> ParsedUrl {
    let (resource_raw, fragment) = match u.split_once('#') {
        Some((r, f)) => (r, Some(f.to_string())),
        None => (u, None),
    };
    let resource = decode_or_raw(resource_raw);
    ParsedUrl {
        resource,
        has_fragment: fragment.is_some(),
        fragment,
    }
}

fn decode_or_raw(s: &str) -> String {
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Matches a leading scheme (`scheme:`) per RFC 3986 `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
#[must_use]
pub fn is_remote(u: &str) -> bool {
    scheme_of(u).is_some()
}

fn scheme_of(u: &str) -> Option<&str> {
    let colon = u.find(':')?;
    let candidate = &u[..colon];
    if candidate.is_empty() {
        return None;
    }
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        Some(candidate)
    } else {
        None
    }
}

#[must_use]
pub fn is_http(u: &str) -> bool {
    scheme_of(u).is_some_and(|s| s.eq_ignore_ascii_case("http"))
}

#[must_use]
pub fn is_https(u: &str) -> bool {
    scheme_of(u).is_some_and(|s| s.eq_ignore_ascii_case("https"))
}

#[must_use]
pub fn is_data_url(u: &str) -> bool {
    scheme_of(u).is_some_and(|s| s.eq_ignore_ascii_case("data"))
}

#[must_use]
pub fn is_file_url(u: &str) -> bool {
    scheme_of(u).is_some_and(|s| s.eq_ignore_ascii_case("file"))
}

/// A leading `/` on the resource part (after any fragment is stripped).
#[must_use]
pub fn has_absolute_path(p: &str) -> bool {
    p.starts_with('/')
}

/// Any `..` path segment, split on `/`.
#[must_use]
pub fn has_parent_directory_reference(p: &str) -> bool {
    p.split('/').any(|segment| segment == "..")
}

/// A URL is malformed if percent-decoding a `%`-escape fails in a way that
/// cannot be safely recovered, or if it contains a bare `%` not followed by
/// two hex digits.
#[must_use]
pub fn is_malformed_url(u: &str) -> bool {
    let resource = u.split('#').next().unwrap_or(u);
    let bytes = resource.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            match hex {
                Some(h) if h.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return true,
            }
        } else {
            i += 1;
        }
    }
    false
}

/// Resolves `href` against two distinct synthetic bases and declares a leak
/// if either resolution escapes its base — this catches `../` sequences that
/// climb out of the OPF directory regardless of how many segments the real
/// OPF directory happens to have.
#[must_use]
pub fn container_leak(href: &str) -> bool {
    escapes_base("a/b/", href) || escapes_base("x/y/z/", href)
}

fn escapes_base(base: &str, href: &str) -> bool {
    let resolved = resolve_segments(base, href);
    !resolved.starts_with(base.trim_end_matches('/'))
        && !is_remote(href)
        && !has_absolute_path(href)
}

/// Applies `.` / `..` / empty-segment resolution rules against `doc_dir`,
/// then re-expresses the result relative to `opf_dir`, producing an
/// NFC-normalized container path. Any fragment on `href` is preserved
/// unmodified on the output.
///
/// # Examples
///
/// ```
/// use epubcheck_core::url::resolve_relative;
///
/// assert_eq!(resolve_relative("OEBPS", "images/cover.png", "OEBPS"), "OEBPS/images/cover.png");
/// assert_eq!(resolve_relative("OEBPS/text", "../images/cover.png", "OEBPS"), "OEBPS/images/cover.png");
/// ```
#[must_use]
pub fn resolve_relative(doc_dir: &str, href: &str, _opf_dir: &str) -> String {
    let parsed = parse_url(href);
    if is_remote(&parsed.resource) || parsed.resource.is_empty() && doc_dir.is_empty() {
        return href.to_string();
    }
    let base = if doc_dir.is_empty() {
        String::new()
    } else {
        format!("{}/", doc_dir.trim_end_matches('/'))
    };
    let combined = resolve_segments(&base, &parsed.resource);
    let normalized: String = combined.nfc().collect();
    match parsed.fragment {
        Some(fragment) => format!("{normalized}#{fragment}"),
        None => normalized,
    }
}

/// Joins `base` (ending in `/` or empty) with `relative`, collapsing `.` and
/// `..` segments, then returns a path with no leading `/` and no trailing
/// slash artifacts.
fn resolve_segments(base: &str, relative: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    let base_segments = base.split('/').filter(|s| !s.is_empty());
    let relative_segments = relative.split('/').filter(|s| !s.is_empty());
    for segment in base_segments.chain(relative_segments) {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

/// True when the resource-part (no fragment) matches the grammar for an
/// "absolute URI" per the RFC 3986 scheme production — used by the content
/// scanner to decide whether a reference should be skipped at extraction
/// time rather than queued for validation.
#[must_use]
pub fn is_absolute_uri(u: &str) -> bool {
    is_remote(u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_splits_fragment() {
        let parsed = parse_url("dir/file.xhtml#frag");
        assert_eq!(parsed.resource, "dir/file.xhtml");
        assert_eq!(parsed.fragment.as_deref(), Some("frag"));
    }

    #[test]
    fn parse_url_percent_decodes_resource() {
        let parsed = parse_url("table%20us%202.png");
        assert_eq!(parsed.resource, "table us 2.png");
    }

    #[test]
    fn parse_url_leaves_invalid_percent_escape_untouched() {
        let parsed = parse_url("broken%zz.png");
        assert_eq!(parsed.resource, "broken%zz.png");
    }

    #[test]
    fn is_remote_detects_scheme() {
        assert!(is_remote("https://example.com/x.png"));
        assert!(is_remote("data:image/png;base64,AAA="));
        assert!(!is_remote("images/cover.png"));
        assert!(!is_remote("../images/cover.png"));
    }

    #[test]
    fn is_http_and_https_are_distinct() {
        assert!(is_http("http://example.com"));
        assert!(!is_https("http://example.com"));
        assert!(is_https("https://example.com"));
        assert!(!is_http("https://example.com"));
    }

    #[test]
    fn scheme_like_colon_in_fragment_is_not_remote() {
        assert!(!is_remote("ch1.xhtml#time:00:01"));
    }

    #[test]
    fn has_absolute_path_detects_leading_slash() {
        assert!(has_absolute_path("/OEBPS/ch1.xhtml"));
        assert!(!has_absolute_path("OEBPS/ch1.xhtml"));
    }

    #[test]
    fn has_parent_directory_reference_detects_dotdot_segment() {
        assert!(has_parent_directory_reference("../images/cover.png"));
        assert!(has_parent_directory_reference("a/../b"));
        assert!(!has_parent_directory_reference("a.../b"));
    }

    #[test]
    fn is_malformed_url_flags_bad_percent_escape() {
        assert!(is_malformed_url("broken%zz.png"));
        assert!(is_malformed_url("truncated%2"));
        assert!(!is_malformed_url("table%20us.png"));
    }

    #[test]
    fn container_leak_detects_parent_escape() {
        assert!(container_leak("../../outside.png"));
        assert!(!container_leak("images/cover.png"));
        assert!(!container_leak("../sibling/cover.png"));
    }

    #[test]
    fn resolve_relative_handles_sibling_directory() {
        let resolved = resolve_relative("OEBPS/text", "../images/cover.png", "OEBPS");
        assert_eq!(resolved, "OEBPS/images/cover.png");
    }

    #[test]
    fn resolve_relative_preserves_fragment() {
        let resolved = resolve_relative("OEBPS", "ch1.xhtml#sec1", "OEBPS");
        assert_eq!(resolved, "OEBPS/ch1.xhtml#sec1");
    }

    /// Once resolved, a reference is a container-root-relative path, so
    /// re-resolving it relative to the container root (`doc_dir = ""`) must
    /// be a no-op. Re-resolving relative to the original `doc_dir` is a
    /// different operation — the path is no longer read from inside that
    /// document — and is not expected to round-trip.
    #[test]
    fn resolve_relative_is_idempotent_on_already_normalized_paths() {
        let once = resolve_relative("OEBPS", "images/cover.png", "OEBPS");
        let twice = resolve_relative("", &once, "OEBPS");
        assert_eq!(once, twice);
    }

    #[test]
    fn resolve_relative_passes_through_remote_urls() {
        let resolved = resolve_relative("OEBPS", "https://example.com/x.png", "OEBPS");
        assert_eq!(resolved, "https://example.com/x.png");
    }
}
