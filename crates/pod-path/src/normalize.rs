//! Request-URL normalization.
//!
//! Every request the protocol handler serves passes through
//! [`normalize_request_url`] first. The steps, in order:
//!
//! 1. Parse as an absolute URL (`400 Invalid URL`).
//! 2. Require the parsed URL to start with the base URL
//!    (`403 Access denied: path outside pod`).
//! 3. Reject `.`/`..` segments in the raw input, including percent-encoded
//!    forms and forms split by the tab or newline characters the URL parser
//!    strips, since the parser would otherwise fold them away
//!    (`400 Invalid path segment`).
//! 4. Split the remainder into segments, dropping empty ones, then
//!    percent-decode and validate each (`400`).
//!
//! The result is the canonical identifier: base URL, followed by the
//! surviving segments in their encoded form, followed by `/` if the input
//! named a container. Query and fragment are not part of an identifier and
//! are dropped.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{PathError, PathResult};
use crate::names::NameRules;

/// Parse and canonicalize a base URL: path-only, always ending with `/`.
pub fn normalize_base(base: &str) -> PathResult<Url> {
    let mut url = Url::parse(base).map_err(|_| PathError::InvalidUrl {
        input: base.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(PathError::InvalidUrl {
            input: base.to_string(),
        });
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Normalize a request URL against `base`, returning the canonical
/// identifier.
pub fn normalize_request_url(input: &str, base: &Url, rules: &NameRules) -> PathResult<String> {
    let parsed = Url::parse(input).map_err(|_| PathError::InvalidUrl {
        input: input.to_string(),
    })?;

    if !parsed.as_str().starts_with(base.as_str()) {
        tracing::warn!(url = %parsed, base = %base, "request outside pod namespace");
        return Err(PathError::OutsidePod {
            url: parsed.to_string(),
        });
    }

    reject_raw_dot_segments(input)?;

    // The base is a prefix of the whole URL, so it is a prefix of the path.
    let rest = &parsed.path()[base.path().len()..];
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    for segment in &segments {
        let decoded = percent_decode_str(segment)
            .decode_utf8()
            .map_err(|_| PathError::InvalidEncoding {
                segment: segment.to_string(),
            })?;
        if decoded == "." || decoded == ".." {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
            });
        }
        rules.validate(&decoded)?;
    }

    let mut id = String::from(base.as_str());
    id.push_str(&segments.join("/"));
    if !segments.is_empty() && rest.ends_with('/') {
        id.push('/');
    }
    Ok(id)
}

/// The identifier of the container that would hold `id`, or `None` for the
/// base itself.
///
/// For a container the trailing segment is removed; for an object, its
/// directory component is kept.
pub fn parent_id(id: &str, base: &Url) -> Option<String> {
    if id.len() <= base.as_str().len() {
        return None;
    }
    let trimmed = id.strip_suffix('/').unwrap_or(id);
    trimmed.rfind('/').map(|idx| trimmed[..=idx].to_string())
}

/// Scan the path of the raw input for dot segments.
///
/// The URL parser silently resolves `a/../b` to `b`, which would turn a
/// traversal attempt into an innocent-looking path. This looks at the text
/// the caller actually sent, after the same cleanup the parser applies:
/// leading and trailing control characters and spaces are trimmed, and
/// tabs and newlines anywhere are removed.
fn reject_raw_dot_segments(input: &str) -> PathResult<()> {
    let cleaned: String = input
        .trim_matches(|c: char| c.is_ascii_control() || c == ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let input = cleaned.as_str();
    let after_scheme = match input.find("://") {
        Some(idx) => &input[idx + 3..],
        None => input.split_once(':').map(|(_, r)| r).unwrap_or(input),
    };
    let path = match after_scheme.find('/') {
        Some(idx) => &after_scheme[idx..],
        None => return Ok(()),
    };
    let path = path.split(['?', '#']).next().unwrap_or(path);

    for segment in path.split(['/', '\\']) {
        let decoded = percent_decode_str(segment).decode_utf8_lossy();
        if decoded == "." || decoded == ".." {
            tracing::warn!(input, "rejected traversal segment");
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://pod.example/";

    fn base() -> Url {
        normalize_base(BASE).unwrap()
    }

    fn norm(input: &str) -> PathResult<String> {
        normalize_request_url(input, &base(), &NameRules::default())
    }

    // -----------------------------------------------------------------------
    // Base handling
    // -----------------------------------------------------------------------

    #[test]
    fn base_gains_trailing_slash() {
        let b = normalize_base("https://pod.example/alice").unwrap();
        assert_eq!(b.as_str(), "https://pod.example/alice/");
    }

    #[test]
    fn base_drops_query_and_fragment() {
        let b = normalize_base("https://pod.example/?x=1#top").unwrap();
        assert_eq!(b.as_str(), "https://pod.example/");
    }

    #[test]
    fn base_must_be_hierarchical() {
        assert!(normalize_base("mailto:someone@pod.example").is_err());
        assert!(normalize_base("not a url").is_err());
    }

    // -----------------------------------------------------------------------
    // Accepted inputs
    // -----------------------------------------------------------------------

    #[test]
    fn root_normalizes_to_base() {
        assert_eq!(norm("https://pod.example/").unwrap(), BASE);
        assert_eq!(norm("https://pod.example").unwrap(), BASE);
    }

    #[test]
    fn object_and_container_preserved() {
        assert_eq!(norm("https://pod.example/a/b.txt").unwrap(), "https://pod.example/a/b.txt");
        assert_eq!(norm("https://pod.example/a/b/").unwrap(), "https://pod.example/a/b/");
    }

    #[test]
    fn duplicate_slashes_collapse() {
        assert_eq!(norm("https://pod.example//a///b.txt").unwrap(), "https://pod.example/a/b.txt");
        assert_eq!(norm("https://pod.example/a//").unwrap(), "https://pod.example/a/");
    }

    #[test]
    fn encoded_names_stay_encoded() {
        assert_eq!(
            norm("https://pod.example/my%20notes.txt").unwrap(),
            "https://pod.example/my%20notes.txt"
        );
    }

    #[test]
    fn query_and_fragment_dropped() {
        assert_eq!(norm("https://pod.example/a.txt?x=1#f").unwrap(), "https://pod.example/a.txt");
    }

    // -----------------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------------

    #[test]
    fn unparseable_is_invalid_url() {
        let err = norm("not a url").unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[test]
    fn traversal_is_rejected() {
        for input in [
            "https://pod.example/../../etc/passwd",
            "https://pod.example/a/../b",
            "https://pod.example/a/%2e%2e/b",
            "https://pod.example/a/%2E%2E",
            "https://pod.example/./a",
            "https://pod.example/a/.\t./b.txt",
            "https://pod.example/a/\n../b.txt",
            "https://pod.example/a/.\r\n/b.txt",
            "https://pod.example/a/..\t",
            "https://pod.example/a/.. ",
        ] {
            let err = norm(input).unwrap_err();
            assert_eq!(err.status(), 400, "{input}");
            assert_eq!(err.to_string(), "Invalid path segment", "{input}");
        }
    }

    #[test]
    fn dots_inside_names_are_fine() {
        assert!(norm("https://pod.example/a..b").is_ok());
        assert!(norm("https://pod.example/.hidden").is_ok());
    }

    #[test]
    fn outside_base_is_forbidden() {
        for input in [
            "https://evil.example/a",
            "http://pod.example/a",
            "https://pod.example.evil/a",
        ] {
            let err = norm(input).unwrap_err();
            assert_eq!(err.status(), 403, "{input}");
            assert_eq!(err.to_string(), "Access denied: path outside pod");
        }
    }

    #[test]
    fn containment_is_checked_before_segments() {
        for input in ["https://evil.example/../x", "https://evil.example/a/%2e%2e/x"] {
            let err = norm(input).unwrap_err();
            assert_eq!(err.status(), 403, "{input}");
        }
    }

    #[test]
    fn sibling_of_nested_base_is_forbidden() {
        let b = normalize_base("https://pod.example/alice/").unwrap();
        let err = normalize_request_url("https://pod.example/alicex/a", &b, &NameRules::default())
            .unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[test]
    fn bad_encoding_is_rejected() {
        let err = norm("https://pod.example/%FF%FE").unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL encoding");
    }

    #[test]
    fn name_rules_propagate() {
        let err = norm("https://pod.example/a%7Cb").unwrap_err();
        assert_eq!(err.code(), "INVALID_NAME");
        assert_eq!(err.to_string(), "Name contains forbidden character '|'");

        let err = norm("https://pod.example/a%2Fb").unwrap_err();
        assert_eq!(err.code(), "INVALID_NAME");
    }

    // -----------------------------------------------------------------------
    // Parent derivation
    // -----------------------------------------------------------------------

    #[test]
    fn parent_of_object_and_container() {
        let b = base();
        assert_eq!(parent_id("https://pod.example/a/b.txt", &b).as_deref(), Some("https://pod.example/a/"));
        assert_eq!(parent_id("https://pod.example/a/b/", &b).as_deref(), Some("https://pod.example/a/"));
        assert_eq!(parent_id("https://pod.example/a/", &b).as_deref(), Some("https://pod.example/"));
        assert_eq!(parent_id("https://pod.example/x", &b).as_deref(), Some("https://pod.example/"));
        assert_eq!(parent_id("https://pod.example/", &b), None);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn normalized_ids_stay_inside_base(segs in proptest::collection::vec("[a-z0-9._-]{1,8}", 0..5)) {
            let input = format!("{BASE}{}", segs.join("/"));
            if let Ok(id) = norm(&input) {
                prop_assert!(id.starts_with(BASE));
                prop_assert!(!id.contains("/../"));
                prop_assert!(!id[BASE.len()..].contains("//"));
            }
        }

        #[test]
        fn any_dotdot_segment_is_rejected(
            prefix in proptest::collection::vec("[a-z]{1,6}", 0..3),
            dotdot in prop_oneof![
                Just(".."),
                Just("%2e%2e"),
                Just(".%2E"),
                Just(".\t."),
                Just("\n.."),
                Just("..\r"),
                Just(".\r\n."),
            ],
            suffix in proptest::collection::vec("[a-z]{1,6}", 0..3),
        ) {
            let mut segs = prefix;
            segs.push(dotdot.to_string());
            segs.extend(suffix);
            let input = format!("{BASE}{}", segs.join("/"));
            prop_assert_eq!(norm(&input).unwrap_err().status(), 400);
        }
    }
}
