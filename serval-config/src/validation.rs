// Configuration validation

use crate::{ConfigError, Result};
use serval_core::{PackageStyle, ResolverSettings};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", field)));
        }
        Ok(())
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of<T: PartialEq>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of the allowed values",
                field
            )));
        }
        Ok(())
    }

    /// A single identifier: ASCII letter or `_` first, then letters, digits
    /// or `_`.
    pub fn is_identifier(value: &str, field: &str) -> Result<()> {
        let mut chars = value.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an identifier, got {:?}",
                field, value
            )));
        }
        Ok(())
    }

    /// A dot-separated namespace such as `com.acme.controllers`.
    pub fn is_package(value: &str, field: &str) -> Result<()> {
        if value.split('.').any(|part| Self::is_identifier(part, field).is_err()) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a dot-separated package name, got {:?}",
                field, value
            )));
        }
        Ok(())
    }
}

impl Validate for ResolverSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.suffix_controller, "suffix_controller")?;
        ConfigValidator::is_identifier(&self.suffix_controller, "suffix_controller")?;
        ConfigValidator::not_empty(&self.suffix_serializer, "suffix_serializer")?;
        ConfigValidator::is_identifier(&self.suffix_serializer, "suffix_serializer")?;

        match self.main_package.as_deref() {
            Some(main) => ConfigValidator::is_package(main, "main_package")?,
            None if self.packages_style != PackageStyle::Off => {
                return Err(ConfigError::ValidationError(format!(
                    "main_package is required for the {} package style",
                    self.packages_style
                )));
            }
            None => {}
        }

        if let Some(alias) = self.alias_controllers_package.as_deref() {
            ConfigValidator::is_package(alias, "alias_controllers_package")?;
        }
        if let Some(alias) = self.alias_serializers_package.as_deref() {
            ConfigValidator::is_package(alias, "alias_serializers_package")?;
        }
        Ok(())
    }
}
