//! Convention-based handler resolution.
//!
//! A [`ResourceFinder`] turns a resource name taken from the URL into the
//! identifier of the handler that should process it, without any route
//! table. Candidates are built from naming conventions and probed against a
//! [`HandlerLookup`] in priority order:
//!
//! 1. `{alias}.{Prefix}{Base}{Suffix}` when an alias namespace is set
//! 2. `{main}.{Prefix}{Base}{Suffix}` ([`PackageStyle::Flat`]) or
//!    `{main}.{resource}.{Prefix}{Base}{Suffix}` ([`PackageStyle::Nested`])
//!
//! where `Base` is the singular, capitalized resource name. When no
//! candidate exists the injected fallback strategy gets the last word.
//!
//! # Examples
//!
//! ```
//! use serval_core::finder::{PackageStyle, ResourceFinder};
//! use std::collections::HashSet;
//!
//! let finder = ResourceFinder::new("com.acme.controllers", "Controller", PackageStyle::Flat);
//! let known: HashSet<String> = ["com.acme.controllers.SessionController".to_string()].into();
//!
//! let id = finder.resolve("sessions", &known).unwrap();
//! assert_eq!(id.as_deref(), Some("com.acme.controllers.SessionController"));
//! assert_eq!(finder.resolve("orders", &known).unwrap(), None);
//! ```

use crate::naming;
use crate::settings::ResolverSettings;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Namespace layout used when building candidate identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStyle {
    /// Every handler lives directly under the main namespace.
    #[default]
    Flat,
    /// Each resource gets its own sub-namespace named after it.
    Nested,
    /// No resolution: a single fixed identifier is always used.
    ///
    /// Settings carry no fixed controller, so a dispatcher in this mode
    /// resolves no controllers: only the index page is served and resource
    /// requests are 404. Serializers still fall back to the built-ins.
    Off,
}

impl PackageStyle {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Some(PackageStyle::Flat),
            "nested" => Some(PackageStyle::Nested),
            "off" => Some(PackageStyle::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStyle::Flat => "flat",
            PackageStyle::Nested => "nested",
            PackageStyle::Off => "off",
        }
    }
}

impl fmt::Display for PackageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Existence probe for handler identifiers.
///
/// Implemented by the handler registries; the set of known identifiers is
/// fixed once the process has started serving requests.
pub trait HandlerLookup: Send + Sync {
    fn exists(&self, identifier: &str) -> bool;
}

impl HandlerLookup for HashSet<String> {
    fn exists(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

/// Fallback consulted when no candidate exists: resource name in, handler
/// identifier (or `None`) out.
pub type FallbackFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves resource names to handler identifiers by convention.
///
/// The package style is fixed at construction. Builder methods consume the
/// finder, so a finder in use is never reconfigured.
#[derive(Clone)]
pub struct ResourceFinder {
    main_package: Option<String>,
    alias_package: Option<String>,
    prefix: Option<String>,
    suffix: String,
    style: PackageStyle,
    fixed: Option<String>,
    fallback: Option<FallbackFn>,
}

impl ResourceFinder {
    /// Create a finder probing under `main_package`.
    pub fn new(main_package: impl Into<String>, suffix: impl Into<String>, style: PackageStyle) -> Self {
        Self {
            main_package: Some(main_package.into()),
            alias_package: None,
            prefix: None,
            suffix: suffix.into(),
            style,
            fixed: None,
            fallback: None,
        }
    }

    /// Create a finder in [`PackageStyle::Off`] mode that always answers
    /// `fixed` without probing.
    pub fn fixed(fixed: Option<String>) -> Self {
        Self {
            main_package: None,
            alias_package: None,
            prefix: None,
            suffix: String::new(),
            style: PackageStyle::Off,
            fixed,
            fallback: None,
        }
    }

    /// Controller finder configured from resolver settings.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the style needs a main package and none
    /// is set.
    pub fn for_controllers(settings: &ResolverSettings) -> Result<Self, Error> {
        Self::from_parts(
            settings,
            settings.alias_controllers_package.as_deref(),
            &settings.suffix_controller,
        )
    }

    pub(crate) fn from_parts(
        settings: &ResolverSettings,
        alias: Option<&str>,
        suffix: &str,
    ) -> Result<Self, Error> {
        if settings.packages_style == PackageStyle::Off {
            return Ok(Self::fixed(None));
        }
        let main = settings
            .main_package
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "main package is required for the {} package style",
                    settings.packages_style
                ))
            })?;

        let mut finder = Self::new(main, suffix, settings.packages_style);
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            finder = finder.with_alias(alias);
        }
        Ok(finder)
    }

    /// Probe `alias` before the main namespace.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias_package = Some(alias.into());
        self
    }

    /// Prepend a capitalized prefix to every candidate's simple name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Install the strategy consulted when no candidate exists.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn style(&self) -> PackageStyle {
        self.style
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn main_package(&self) -> Option<&str> {
        self.main_package.as_deref()
    }

    pub fn alias_package(&self) -> Option<&str> {
        self.alias_package.as_deref()
    }

    /// Candidate identifiers for `resource_name`, most specific first.
    ///
    /// Empty in [`PackageStyle::Off`] mode.
    pub fn candidates(&self, resource_name: &str) -> Result<Vec<String>, Error> {
        if self.style == PackageStyle::Off {
            return Ok(Vec::new());
        }

        let simple = naming::class_name(self.prefix.as_deref(), resource_name, &self.suffix)?;
        let mut candidates = Vec::with_capacity(2);

        if let Some(alias) = &self.alias_package {
            candidates.push(naming::qualify(alias, &simple));
        }

        let main = self.main_package.as_deref().unwrap_or_default();
        let namespace = match self.style {
            PackageStyle::Nested => naming::qualify(main, resource_name),
            _ => main.to_string(),
        };
        candidates.push(naming::qualify(&namespace, &simple));

        Ok(candidates)
    }

    /// Resolve `resource_name` to a handler identifier.
    ///
    /// `Ok(None)` means no handler exists for the resource; the caller
    /// decides what that degrades to.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for an empty resource name.
    pub fn resolve(
        &self,
        resource_name: &str,
        lookup: &dyn HandlerLookup,
    ) -> Result<Option<String>, Error> {
        if self.style == PackageStyle::Off {
            return Ok(self.fixed.clone());
        }

        for candidate in self.candidates(resource_name)? {
            tracing::trace!(resource = %resource_name, candidate = %candidate, "Probing handler");
            if lookup.exists(&candidate) {
                tracing::debug!(resource = %resource_name, handler = %candidate, "Resolved handler");
                return Ok(Some(candidate));
            }
        }

        let fallback = self.default_resource(resource_name);
        match &fallback {
            Some(id) => {
                tracing::debug!(resource = %resource_name, handler = %id, "Using fallback handler")
            }
            None => tracing::debug!(resource = %resource_name, suffix = %self.suffix, "No handler found"),
        }
        Ok(fallback)
    }

    fn default_resource(&self, resource_name: &str) -> Option<String> {
        self.fallback.as_ref().and_then(|fallback| fallback(resource_name))
    }
}

impl fmt::Debug for ResourceFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFinder")
            .field("main_package", &self.main_package)
            .field("alias_package", &self.alias_package)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("style", &self.style)
            .field("fixed", &self.fixed)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
