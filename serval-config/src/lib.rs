//! Configuration for the Serval resolver.
//!
//! Collects resolver settings from configuration files, `.env` files and
//! `SERVAL_*` environment variables, later sources overriding earlier ones,
//! and turns them into validated [`ResolverSettings`]:
//!
//! ```no_run
//! use serval_config::{ConfigManager, FileFormat};
//!
//! let config = ConfigManager::new();
//! config.load_file("serval.properties", FileFormat::Properties)?;
//! config.load_env()?;
//!
//! let settings = config.resolver_settings()?;
//! # Ok::<(), serval_config::ConfigError>(())
//! ```
//!
//! Keys are normalized on the way in: `main.package`, `main-package` and
//! `MAIN_PACKAGE` all address `main_package`.

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{EnvLoader, DEFAULT_ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serval_core::ResolverSettings;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Normalized form of a configuration key: lowercase, with `.` and `-`
/// turned into `_`.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['.', '-'], "_")
}

/// Main configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Manager reading `SERVAL_*` environment variables.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Create with a custom environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;
        tracing::debug!(count = env_vars.len(), prefix = ?self.env_prefix, "Loaded environment configuration");

        let mut config = self.config.write();
        for (key, value) in env_vars {
            config.insert(key, serde_json::Value::String(value));
        }

        Ok(())
    }

    /// Load a `.env` file into the process environment, then the environment.
    ///
    /// Without a path, a missing `.env` in the working directory is not an
    /// error.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::new(format).load_file(path)?;
        tracing::debug!(path = %path.display(), keys = data.len(), "Loaded configuration file");

        let mut config = self.config.write();
        config.extend(data);

        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.config.write().insert(normalize_key(key), json_value);
        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.config.read();

        let value = config
            .get(&normalize_key(key))
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone()).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(&normalize_key(key))
    }

    /// All configuration keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Merge configuration from another manager; its values win.
    pub fn merge(&self, other: &ConfigManager) {
        if Arc::ptr_eq(&self.config, &other.config) {
            return;
        }
        let other_config = other.config.read().clone();
        self.config.write().extend(other_config);
    }

    /// Deserialize everything loaded so far into `T` and validate it.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = serde_json::Value::Object(self.config.read().clone().into_iter().collect());

        let validated: T =
            serde_json::from_value(json_value).map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;
        Ok(validated)
    }

    /// Validated resolver settings. Unset fields keep their defaults and the
    /// package style is matched case-insensitively.
    pub fn resolver_settings(&self) -> Result<ResolverSettings> {
        if let Some(serde_json::Value::String(style)) = self.config.write().get_mut("packages_style") {
            let parsed = serval_core::PackageStyle::from_str(style).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "packages_style must be flat, nested or off, got {:?}",
                    style
                ))
            })?;
            *style = parsed.as_str().to_string();
        }

        let settings: ResolverSettings = self.load_validated()?;
        tracing::info!(
            main_package = ?settings.main_package,
            style = %settings.packages_style,
            "Resolver settings loaded"
        );
        Ok(settings)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("keys", &self.keys())
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serval_core::PackageStyle;

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.set("main.package", "com.acme").unwrap();

        let value: String = manager.get("main_package").unwrap();
        assert_eq!(value, "com.acme");
        assert_eq!(manager.get_string("MAIN-PACKAGE").unwrap(), "com.acme");
    }

    #[test]
    fn test_get_or_default() {
        let manager = ConfigManager::new();
        let value: String = manager.get_or("missing_key", "default_value".to_string());
        assert_eq!(value, "default_value");
        assert!(matches!(
            manager.get::<String>("missing_key"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_has_and_keys() {
        let manager = ConfigManager::new();
        manager.set("suffix.controller", "Handler").unwrap();
        manager.set("main.package", "com.acme").unwrap();

        assert!(manager.has("suffix_controller"));
        assert!(!manager.has("suffix_serializer"));
        assert_eq!(manager.keys(), vec!["main_package", "suffix_controller"]);
    }

    #[test]
    fn test_merge_overrides() {
        let base = ConfigManager::new();
        base.set("main_package", "com.base").unwrap();
        base.set("suffix_controller", "Controller").unwrap();

        let overrides = ConfigManager::new();
        overrides.set("main_package", "com.acme").unwrap();

        base.merge(&overrides);
        base.merge(&base.clone());
        assert_eq!(base.get_string("main_package").unwrap(), "com.acme");
        assert_eq!(base.get_string("suffix_controller").unwrap(), "Controller");
    }

    #[test]
    fn test_resolver_settings_defaults() {
        let manager = ConfigManager::new();
        manager.set("main.package", "com.acme").unwrap();
        manager.set("packages.style", "NESTED").unwrap();

        let settings = manager.resolver_settings().unwrap();
        assert_eq!(settings.main_package.as_deref(), Some("com.acme"));
        assert_eq!(settings.packages_style, PackageStyle::Nested);
        assert_eq!(settings.suffix_controller, "Controller");
        assert_eq!(settings.suffix_serializer, "Serializer");
    }

    #[test]
    fn test_resolver_settings_rejects_unknown_style() {
        let manager = ConfigManager::new();
        manager.set("main_package", "com.acme").unwrap();
        manager.set("packages_style", "deep").unwrap();
        assert!(matches!(
            manager.resolver_settings(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_resolver_settings_requires_main_package() {
        let manager = ConfigManager::new();
        assert!(matches!(
            manager.resolver_settings(),
            Err(ConfigError::ValidationError(_))
        ));

        manager.set("packages_style", "off").unwrap();
        let settings = manager.resolver_settings().unwrap();
        assert_eq!(settings.packages_style, PackageStyle::Off);
    }
}
