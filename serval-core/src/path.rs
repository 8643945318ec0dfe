//! Decomposition of REST-style paths into resource chains.
//!
//! Segments are paired as `(resource, identifier)`; a trailing unpaired
//! segment is a resource without identifier (a collection-level request).
//!
//! ```text
//! /sessions/1/users/2.json -> [(sessions, 1), (users, 2)]   extension: json
//! /sessions/1/users        -> [(sessions, 1), (users, -)]
//! /sessions.xml            -> [(sessions, -)]               extension: xml
//! /                        -> []
//! ```
//!
//! The extension is whatever follows the last dot of the final segment.
//! Identifiers are opaque strings and are never parsed.

use crate::naming;
use std::fmt;

/// One hop of a nested resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceSegment {
    pub name: String,
    pub identifier: Option<String>,
}

impl ResourceSegment {
    pub fn new(name: impl Into<String>, identifier: Option<String>) -> Self {
        Self {
            name: name.into(),
            identifier,
        }
    }

    /// Whether this segment names `resource`, comparing singular forms
    /// case-insensitively (`session` matches `sessions`).
    pub fn is(&self, resource: &str) -> bool {
        naming::singularize(&self.name).eq_ignore_ascii_case(&naming::singularize(resource))
    }
}

/// The resource chain decoded from a request path, plus its extension.
///
/// Built once per request and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath {
    chain: Vec<ResourceSegment>,
    extension: Option<String>,
}

impl ResourcePath {
    /// Parse a slash-delimited path. Query strings and fragments are ignored,
    /// empty segments are skipped and segments are percent-decoded.
    pub fn parse(path: &str) -> Self {
        let end = path.find(['?', '#']).unwrap_or(path.len());
        let mut segments: Vec<String> = path[..end]
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();

        let extension = segments.last_mut().and_then(split_extension);

        let chain = segments
            .chunks(2)
            .map(|pair| ResourceSegment::new(pair[0].clone(), pair.get(1).cloned()))
            .collect();

        Self { chain, extension }
    }

    pub fn chain(&self) -> &[ResourceSegment] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// The most deeply nested segment: the resource the request is about.
    pub fn current(&self) -> Option<&ResourceSegment> {
        self.chain.last()
    }

    /// Name of the current resource.
    pub fn resource(&self) -> Option<&str> {
        self.current().map(|segment| segment.name.as_str())
    }

    /// Identifier of the current resource.
    ///
    /// `/sessions/1` gives `1`, `/sessions/1/users/2` gives `2`, and
    /// `/sessions` gives `None`.
    pub fn id(&self) -> Option<&str> {
        self.current().and_then(|segment| segment.identifier.as_deref())
    }

    /// Identifier of the first segment naming `resource` (singular or
    /// plural). `None` when the resource is absent or carries no id.
    pub fn id_of(&self, resource: &str) -> Option<&str> {
        self.chain
            .iter()
            .find(|segment| segment.is(resource))
            .and_then(|segment| segment.identifier.as_deref())
    }

    /// Identifier at nesting depth `depth` (0 is the outermost resource).
    pub fn id_at(&self, depth: usize) -> Option<&str> {
        self.chain
            .get(depth)
            .and_then(|segment| segment.identifier.as_deref())
    }

    /// URL extension, if the path carried one.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.chain {
            write!(f, "/{}", segment.name)?;
            if let Some(id) = &segment.identifier {
                write!(f, "/{}", id)?;
            }
        }
        if self.chain.is_empty() {
            f.write_str("/")?;
        }
        if let Some(ext) = &self.extension {
            write!(f, ".{}", ext)?;
        }
        Ok(())
    }
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Split `name.ext` in place, returning `ext`. Leading or trailing dots
/// (`.hidden`, `name.`) are not extensions.
fn split_extension(segment: &mut String) -> Option<String> {
    let dot = segment.rfind('.')?;
    if dot == 0 || dot + 1 == segment.len() {
        return None;
    }
    let extension = segment[dot + 1..].to_string();
    segment.truncate(dot);
    Some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_chain() {
        let path = ResourcePath::parse("/sessions/1/users/2");
        assert_eq!(
            path.chain(),
            &[
                ResourceSegment::new("sessions", Some("1".into())),
                ResourceSegment::new("users", Some("2".into())),
            ]
        );
        assert_eq!(path.id(), Some("2"));
        assert_eq!(path.id_of("sessions"), Some("1"));
        assert_eq!(path.id_of("session"), Some("1"));
        assert_eq!(path.id_of("orders"), None);
        assert_eq!(path.resource(), Some("users"));
    }

    #[test]
    fn test_collection_request() {
        let path = ResourcePath::parse("/sessions");
        assert_eq!(path.chain(), &[ResourceSegment::new("sessions", None)]);
        assert_eq!(path.id(), None);
    }

    #[test]
    fn test_empty_path() {
        for raw in ["", "/", "//", "/?page=1"] {
            let path = ResourcePath::parse(raw);
            assert!(path.is_empty(), "{raw:?} should give an empty chain");
            assert_eq!(path.id(), None);
            assert_eq!(path.extension(), None);
            assert_eq!(path.resource(), None);
        }
    }

    #[test]
    fn test_extension_on_identifier() {
        let path = ResourcePath::parse("/sessions/1/users/2.json");
        assert_eq!(path.extension(), Some("json"));
        assert_eq!(path.id(), Some("2"));
    }

    #[test]
    fn test_extension_on_collection() {
        let path = ResourcePath::parse("/sessions.xml?limit=10");
        assert_eq!(path.extension(), Some("xml"));
        assert_eq!(path.resource(), Some("sessions"));
        assert_eq!(path.id(), None);
    }

    #[test]
    fn test_dot_edge_cases() {
        assert_eq!(ResourcePath::parse("/files/.hidden").extension(), None);
        assert_eq!(ResourcePath::parse("/files/name.").extension(), None);
        let path = ResourcePath::parse("/files/report.v2.pdf");
        assert_eq!(path.extension(), Some("pdf"));
        assert_eq!(path.id(), Some("report.v2"));
    }

    #[test]
    fn test_opaque_identifiers() {
        let path = ResourcePath::parse("/users/john%20doe/orders/abc-123");
        assert_eq!(path.id_of("users"), Some("john doe"));
        assert_eq!(path.id(), Some("abc-123"));
    }

    #[test]
    fn test_id_at_depth() {
        let path = ResourcePath::parse("/sessions/1/users/2/orders");
        assert_eq!(path.id_at(0), Some("1"));
        assert_eq!(path.id_at(1), Some("2"));
        assert_eq!(path.id_at(2), None);
        assert_eq!(path.id_at(9), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourcePath::parse("/sessions/1/users.json").to_string(), "/sessions/1/users.json");
        assert_eq!(ResourcePath::parse("").to_string(), "/");
    }
}
