//! Serializer resolution and the content-type / extension table.
//!
//! A [`SerializerFinder`] looks for a serializer named after the requested
//! extension and resource (`json` + `sessions` -> `JsonSessionSerializer`)
//! in the configured namespaces. When none exists, the built-in serializer
//! for the extension is used, if there is one:
//!
//! | extension | built-in identifier                    |
//! |-----------|----------------------------------------|
//! | `json`    | `serval.serializers.JsonSerializer`    |
//! | `xml`     | `serval.serializers.XmlSerializer`     |
//! | `base64`  | `serval.serializers.Base64Serializer`  |
//! | `file`    | `serval.serializers.FileSerializer`    |
//!
//! Any other extension without a custom serializer resolves to `None` and
//! the request is rendered as a page.
//!
//! # Content types
//!
//! [`ExtensionMapping`] is a process-wide table built once, on first access
//! or eagerly through [`ExtensionMapping::init`]. Both `base64` and `file`
//! are registered for `application/octet-stream`; a content-type lookup for
//! it therefore answers `file`, the last one registered.

use crate::finder::{HandlerLookup, ResourceFinder};
use crate::naming;
use crate::settings::ResolverSettings;
use crate::Error;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Namespace of the framework-provided serializers.
pub const DEFAULT_SERIALIZERS_PACKAGE: &str = "serval.serializers";

pub const PAGE_EXTENSION: &str = "page";
pub const JSON_EXTENSION: &str = "json";
pub const XML_EXTENSION: &str = "xml";
pub const BASE64_EXTENSION: &str = "base64";
pub const FILE_EXTENSION: &str = "file";

/// Extensions that have a built-in fallback serializer.
pub const BUILTIN_EXTENSIONS: [&str; 4] = [JSON_EXTENSION, XML_EXTENSION, BASE64_EXTENSION, FILE_EXTENSION];

/// Registration order matters: later entries win on duplicate content types.
const CONTENT_TYPES: [(&str, &str); 4] = [
    ("application/json", JSON_EXTENSION),
    ("text/xml", XML_EXTENSION),
    ("application/octet-stream", BASE64_EXTENSION),
    ("application/octet-stream", FILE_EXTENSION),
];

static EXTENSIONS: Lazy<ExtensionMapping> = Lazy::new(ExtensionMapping::build);

/// Bidirectional content-type / extension table.
#[derive(Debug)]
pub struct ExtensionMapping {
    by_content_type: HashMap<&'static str, &'static str>,
    by_extension: HashMap<&'static str, &'static str>,
}

impl ExtensionMapping {
    fn build() -> Self {
        let mut by_content_type = HashMap::with_capacity(CONTENT_TYPES.len());
        let mut by_extension = HashMap::with_capacity(CONTENT_TYPES.len());
        for (content_type, extension) in CONTENT_TYPES {
            by_content_type.insert(content_type, extension);
            by_extension.insert(extension, content_type);
        }
        tracing::debug!(entries = CONTENT_TYPES.len(), "Extension table initialized");
        Self {
            by_content_type,
            by_extension,
        }
    }

    /// The process-wide table.
    pub fn global() -> &'static ExtensionMapping {
        &EXTENSIONS
    }

    /// Build the table now instead of on first lookup.
    pub fn init() {
        Lazy::force(&EXTENSIONS);
    }

    /// Extension registered for an exact content type.
    pub fn extension(&self, content_type: &str) -> Option<&'static str> {
        self.by_content_type.get(content_type).copied()
    }

    /// Content type registered for an extension (case-insensitive).
    pub fn content_type(&self, extension: &str) -> Option<&'static str> {
        self.by_extension
            .get(extension.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

/// Extension for a content type, or `None` when the content type is not in
/// the table. `None` is not an error: callers fall back to the URL extension
/// or to page rendering.
pub fn get_extension(content_type: &str) -> Option<&'static str> {
    ExtensionMapping::global().extension(content_type)
}

/// Built-in serializer identifier for `extension`, if it is one of the
/// built-in kinds. Case-insensitive.
pub fn default_serializer(extension: &str) -> Option<String> {
    let kind = BUILTIN_EXTENSIONS
        .iter()
        .find(|builtin| builtin.eq_ignore_ascii_case(extension))?;
    Some(builtin_identifier(kind))
}

/// Identifier of the page serializer: the answer for requests without an
/// extension when no custom page serializer exists.
pub fn page_serializer() -> String {
    builtin_identifier(PAGE_EXTENSION)
}

/// Fallback once custom serializers are exhausted: the page serializer for
/// `page`, the built-in serializer for the built-in kinds, else `None`.
fn fallback_serializer(extension: &str) -> Option<String> {
    if extension.eq_ignore_ascii_case(PAGE_EXTENSION) {
        Some(page_serializer())
    } else {
        default_serializer(extension)
    }
}

fn builtin_identifier(kind: &str) -> String {
    let mut name = naming::capitalize(kind).unwrap_or_default();
    name.push_str("Serializer");
    naming::qualify(DEFAULT_SERIALIZERS_PACKAGE, &name)
}

/// Finds the serializer for a requested extension.
#[derive(Debug, Clone)]
pub struct SerializerFinder {
    extension: String,
    finder: ResourceFinder,
}

impl SerializerFinder {
    /// Finder without any configured namespace.
    ///
    /// Always answers the built-in serializer for the extension (`page` when
    /// `extension` is `None`), or `None` for unknown extensions.
    pub fn new(extension: Option<&str>) -> Self {
        let extension = extension.unwrap_or(PAGE_EXTENSION).to_string();
        Self {
            finder: ResourceFinder::fixed(fallback_serializer(&extension)),
            extension,
        }
    }

    /// Finder probing the configured namespaces before the built-ins. In
    /// [`PackageStyle::Off`](crate::finder::PackageStyle::Off) mode nothing is
    /// probed and the answer is the same fallback the probing styles end on.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the settings lack a main package for a
    /// probing style.
    pub fn from_settings(settings: &ResolverSettings, extension: Option<&str>) -> Result<Self, Error> {
        let extension = extension.unwrap_or(PAGE_EXTENSION).to_string();
        let finder = ResourceFinder::from_parts(
            settings,
            settings.alias_serializers_package.as_deref(),
            &settings.suffix_serializer,
        )?;

        if finder.style() == crate::finder::PackageStyle::Off {
            return Ok(Self::new(Some(&extension)));
        }

        let fallback_extension = extension.clone();
        let finder = finder
            .with_prefix(extension.clone())
            .with_fallback(move |_| fallback_serializer(&fallback_extension));

        Ok(Self { extension, finder })
    }

    /// The requested extension; `page` when the request had none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_page(&self) -> bool {
        self.extension.eq_ignore_ascii_case(PAGE_EXTENSION)
    }

    /// Custom serializer candidates, alias namespace first.
    pub fn candidates(&self, resource_name: &str) -> Result<Vec<String>, Error> {
        self.finder.candidates(resource_name)
    }

    /// Resolve the serializer for `resource_name`.
    pub fn resolve(&self, resource_name: &str, lookup: &dyn HandlerLookup) -> Result<Option<String>, Error> {
        self.finder.resolve(resource_name, lookup)
    }
}
