//! Media type parsing for `Content-Type` and `Accept` header values.
//!
//! Only used to normalize header values before they are looked up in the
//! extension table; no negotiation happens beyond picking the client's
//! preferred entry.
//!
//! ```
//! use serval_core::media_type::{Accept, MediaType};
//!
//! let ct = MediaType::parse("Application/JSON; charset=utf-8").unwrap();
//! assert_eq!(ct.mime_type(), "application/json");
//!
//! let accept = Accept::parse("text/html;q=0.8, text/xml");
//! assert_eq!(accept.preferred().map(|m| m.mime_type()), Some("text/xml".to_string()));
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Represents a media type (MIME type) with optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// The type (e.g., "application", "text")
    pub type_: String,
    /// The subtype (e.g., "json", "xml")
    pub subtype: String,
    /// Optional parameters (e.g., charset=utf-8)
    pub params: HashMap<String, String>,
}

impl MediaType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            subtype: subtype.into(),
            params: HashMap::new(),
        }
    }

    /// Parse a media type from a header value (quality values are dropped).
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(';');

        let (type_, subtype) = parts.next()?.trim().split_once('/')?;
        let type_ = type_.trim().to_lowercase();
        let subtype = subtype.trim().to_lowercase();
        if type_.is_empty() || subtype.is_empty() {
            return None;
        }

        let params = parts
            .filter_map(|param| param.split_once('='))
            .map(|(key, value)| (key.trim().to_lowercase(), value.trim().trim_matches('"').to_string()))
            .filter(|(key, _)| key != "q")
            .collect();

        Some(Self {
            type_,
            subtype,
            params,
        })
    }

    /// Check if this media type matches another (considering wildcards).
    pub fn matches(&self, other: &MediaType) -> bool {
        let type_matches = self.type_ == "*" || other.type_ == "*" || self.type_ == other.type_;
        let subtype_matches =
            self.subtype == "*" || other.subtype == "*" || self.subtype == other.subtype;
        type_matches && subtype_matches
    }

    /// Whether either half is a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.type_ == "*" || self.subtype == "*"
    }

    /// `type/subtype` without parameters.
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (key, value) in &self.params {
            write!(f, "; {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Represents a parsed `Accept` header with quality values.
#[derive(Debug, Clone, Default)]
pub struct Accept {
    /// Media types with their quality values, sorted by preference.
    pub media_types: Vec<(MediaType, f32)>,
}

impl Accept {
    /// Parse an Accept header string.
    pub fn parse(header: &str) -> Self {
        let mut media_types: Vec<(MediaType, f32)> = header
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| {
                MediaType::parse(part).map(|mt| (mt, Self::quality(part)))
            })
            .collect();

        // Highest quality first, then the more specific type
        media_types.sort_by(|a, b| match b.1.partial_cmp(&a.1) {
            Some(Ordering::Equal) | None => Self::specificity(&b.0).cmp(&Self::specificity(&a.0)),
            Some(ord) => ord,
        });

        Self { media_types }
    }

    /// Quality of one `Accept` entry: its `q` parameter, 1.0 when absent
    /// or unparsable.
    fn quality(entry: &str) -> f32 {
        entry
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    fn specificity(mt: &MediaType) -> u8 {
        u8::from(mt.type_ != "*") * 2 + u8::from(mt.subtype != "*")
    }

    /// The client's most preferred media type with a non-zero quality.
    pub fn preferred(&self) -> Option<&MediaType> {
        self.media_types
            .iter()
            .find(|(_, quality)| *quality > 0.0)
            .map(|(mt, _)| mt)
    }
}
