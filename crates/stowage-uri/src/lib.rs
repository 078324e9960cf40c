//! URI value type for stowage.
//!
//! A [`Uri`] is an opaque identifier with a scheme, a canonical string form,
//! and a handful of path accessors. Repositories never build URIs by string
//! concatenation on their own; they go through [`Uri::parse`] so every value
//! satisfies the same invariants:
//!
//! - the scheme is non-empty, RFC3986-shaped, and stored lower-cased
//! - a non-root path carries no trailing `/` (`mem:///a/` becomes `mem:///a`)
//! - equality and hashing are on the canonical string
//!
//! Two layouts are recognized:
//!
//! ```text
//! scheme://authority/path    hierarchical (authority may be empty)
//! scheme:path                opaque
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Path separator used by every URI layout.
pub const SEPARATOR: char = '/';

/// Error from parsing a URI string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    #[error("empty URI")]
    Empty,
    #[error("missing scheme in '{0}'")]
    MissingScheme(String),
    #[error("invalid scheme '{scheme}' in '{uri}'")]
    InvalidScheme { scheme: String, uri: String },
    #[error("control character in '{0}'")]
    ControlCharacter(String),
}

/// A parsed, canonicalized URI.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uri {
    raw: String,
    /// Byte offset of the `:` ending the scheme.
    scheme_end: usize,
    /// Byte offset where the path begins (after any authority).
    path_start: usize,
}

impl Uri {
    /// Parse and canonicalize a URI string.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, UriError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(UriError::Empty);
        }
        if input.chars().any(char::is_control) {
            return Err(UriError::ControlCharacter(input.to_string()));
        }

        let scheme_end = input
            .find(':')
            .ok_or_else(|| UriError::MissingScheme(input.to_string()))?;
        let scheme = &input[..scheme_end];
        if !is_valid_scheme(scheme) {
            return Err(if scheme.is_empty() {
                UriError::MissingScheme(input.to_string())
            } else {
                UriError::InvalidScheme {
                    scheme: scheme.to_string(),
                    uri: input.to_string(),
                }
            });
        }

        let rest = &input[scheme_end + 1..];
        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => match after.find(SEPARATOR) {
                Some(idx) => (Some(&after[..idx]), &after[idx..]),
                None => (Some(after), ""),
            },
            None => (None, rest),
        };

        let mut raw = String::with_capacity(input.len());
        raw.push_str(&scheme.to_ascii_lowercase());
        raw.push(':');
        if let Some(authority) = authority {
            raw.push_str("//");
            raw.push_str(authority);
        }
        let path_start = raw.len();
        raw.push_str(canonical_path(path));

        Ok(Self {
            raw,
            scheme_end,
            path_start,
        })
    }

    /// The lower-cased scheme, without the trailing `:`.
    pub fn scheme(&self) -> &str {
        &self.raw[..self.scheme_end]
    }

    /// The authority of a hierarchical URI (`None` for opaque URIs).
    ///
    /// `file:///etc` has an empty authority, which is still `Some("")`.
    pub fn authority(&self) -> Option<&str> {
        let after_scheme = &self.raw[self.scheme_end + 1..self.path_start];
        after_scheme.strip_prefix("//")
    }

    /// The path component. May be empty.
    pub fn path(&self) -> &str {
        &self.raw[self.path_start..]
    }

    /// Everything before the path: `scheme:` plus `//authority` if present.
    pub fn prefix(&self) -> &str {
        &self.raw[..self.path_start]
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the path has no segment left to strip.
    pub fn is_root(&self) -> bool {
        let path = self.path();
        path.is_empty()
            || path == "/"
            || (self.authority().is_none() && !path.contains(SEPARATOR))
    }

    /// The final path segment, or `""` for a root.
    pub fn name(&self) -> &str {
        let path = self.path();
        match path.rfind(SEPARATOR) {
            Some(idx) => &path[idx + 1..],
            None => path,
        }
    }

    /// The extension of [`name`](Self::name) including the dot, or `""`.
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(idx) => &name[idx..],
        }
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Strip trailing separators from a non-root path.
fn canonical_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && path.starts_with(SEPARATOR) {
        "/"
    } else {
        trimmed
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({})", self.raw)
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uri {
    type Error = UriError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = UriError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> String {
        uri.raw
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchical_parts() {
        let uri = Uri::parse("file:///home/user/notes.txt").unwrap();
        assert_eq!(uri.scheme(), "file");
        assert_eq!(uri.authority(), Some(""));
        assert_eq!(uri.path(), "/home/user/notes.txt");
        assert_eq!(uri.prefix(), "file://");
        assert_eq!(uri.name(), "notes.txt");
        assert_eq!(uri.extension(), ".txt");
    }

    #[test]
    fn test_authority() {
        let uri = Uri::parse("http://example.com/a/b").unwrap();
        assert_eq!(uri.authority(), Some("example.com"));
        assert_eq!(uri.path(), "/a/b");
        assert_eq!(uri.prefix(), "http://example.com");
    }

    #[test]
    fn test_opaque() {
        let uri = Uri::parse("mem:bucket/key").unwrap();
        assert_eq!(uri.authority(), None);
        assert_eq!(uri.path(), "bucket/key");
        assert_eq!(uri.name(), "key");
    }

    #[test]
    fn test_scheme_is_lowercased() {
        let uri = Uri::parse("MEM:///a").unwrap();
        assert_eq!(uri.scheme(), "mem");
        assert_eq!(uri.as_str(), "mem:///a");
        assert_eq!(uri, Uri::parse("mem:///a").unwrap());
    }

    #[test]
    fn test_trailing_separator_is_canonicalized() {
        assert_eq!(Uri::parse("mem:///a/b/").unwrap().as_str(), "mem:///a/b");
        assert_eq!(Uri::parse("mem:///").unwrap().as_str(), "mem:///");
        assert_eq!(Uri::parse("mem:///a//").unwrap().as_str(), "mem:///a");
    }

    #[test]
    fn test_roots() {
        assert!(Uri::parse("mem://").unwrap().is_root());
        assert!(Uri::parse("mem:///").unwrap().is_root());
        assert!(Uri::parse("mem://host/").unwrap().is_root());
        assert!(Uri::parse("mem:single").unwrap().is_root());
        assert!(!Uri::parse("mem:///a").unwrap().is_root());
        assert!(!Uri::parse("mem:a/b").unwrap().is_root());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(Uri::parse(""), Err(UriError::Empty));
        assert!(matches!(
            Uri::parse("no-scheme-here"),
            Err(UriError::MissingScheme(_))
        ));
        assert!(matches!(Uri::parse(":///a"), Err(UriError::MissingScheme(_))));
        assert!(matches!(
            Uri::parse("1abc:///a"),
            Err(UriError::InvalidScheme { .. })
        ));
        assert!(matches!(
            Uri::parse("mem:///a\nb"),
            Err(UriError::ControlCharacter(_))
        ));
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(Uri::parse("mem:///.hidden").unwrap().extension(), "");
        assert_eq!(Uri::parse("mem:///archive.tar.gz").unwrap().extension(), ".gz");
        assert_eq!(Uri::parse("mem:///noext").unwrap().extension(), "");
    }

    #[test]
    fn test_serde_transparent_string() {
        let uri = Uri::parse("mem:///a/b").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"mem:///a/b\"");

        let back: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);

        let bad: Result<Uri, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_display_and_debug() {
        let uri: Uri = "mem:///x".parse().unwrap();
        assert_eq!(uri.to_string(), "mem:///x");
        assert_eq!(format!("{uri:?}"), "Uri(mem:///x)");
    }
}
