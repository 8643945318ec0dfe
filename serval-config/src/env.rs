// Environment variable loading

use crate::{normalize_key, ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix of the environment variables read by default.
pub const DEFAULT_ENV_PREFIX: &str = "SERVAL";

/// Environment variable loader
///
/// With prefix `SERVAL`, `SERVAL_MAIN_PACKAGE` is loaded as `main_package`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load every matching variable under its normalized key.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.collect(env::vars()))
    }

    fn collect(&self, vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
        let mut config = HashMap::new();
        for (key, value) in vars {
            let name = match &self.prefix {
                Some(prefix) => match key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                {
                    Some(rest) if !rest.is_empty() => rest,
                    _ => continue,
                },
                None => key.as_str(),
            };
            config.insert(normalize_key(name), value);
        }
        config
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let key = key.to_uppercase().replace(['.', '-'], "_");
        let full_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key),
            None => key,
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_ENV_PREFIX.to_string()))
    }
}
