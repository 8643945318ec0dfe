// Resolver settings consumed by the finders

use crate::finder::PackageStyle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTROLLER_SUFFIX: &str = "Controller";
pub const DEFAULT_SERIALIZER_SUFFIX: &str = "Serializer";

/// Naming configuration for controller and serializer resolution.
///
/// Loading these from files or the environment is the job of the
/// `serval-config` crate; the engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Namespace root for controllers and serializers.
    pub main_package: Option<String>,
    /// Namespace probed before `main_package` for controllers.
    pub alias_controllers_package: Option<String>,
    /// Namespace probed before `main_package` for serializers.
    pub alias_serializers_package: Option<String>,
    pub suffix_controller: String,
    pub suffix_serializer: String,
    pub packages_style: PackageStyle,
}

impl ResolverSettings {
    pub fn new(main_package: impl Into<String>) -> Self {
        Self {
            main_package: Some(main_package.into()),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: PackageStyle) -> Self {
        self.packages_style = style;
        self
    }

    pub fn with_controller_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias_controllers_package = Some(alias.into());
        self
    }

    pub fn with_serializer_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias_serializers_package = Some(alias.into());
        self
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            main_package: None,
            alias_controllers_package: None,
            alias_serializers_package: None,
            suffix_controller: DEFAULT_CONTROLLER_SUFFIX.to_string(),
            suffix_serializer: DEFAULT_SERIALIZER_SUFFIX.to_string(),
            packages_style: PackageStyle::Flat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.suffix_controller, "Controller");
        assert_eq!(settings.suffix_serializer, "Serializer");
        assert_eq!(settings.packages_style, PackageStyle::Flat);
        assert!(settings.main_package.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: ResolverSettings = serde_json::from_value(serde_json::json!({
            "main_package": "com.acme",
            "packages_style": "nested"
        }))
        .unwrap();
        assert_eq!(settings.main_package.as_deref(), Some("com.acme"));
        assert_eq!(settings.packages_style, PackageStyle::Nested);
        assert_eq!(settings.suffix_controller, "Controller");
    }
}
