// Configuration file loaders

use crate::{normalize_key, ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    /// `key=value` / `key: value` lines, as in `.properties` and `.env` files
    Properties,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "properties" | "env" => Some(FileFormat::Properties),
            _ => None,
        }
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension: {}", path.display())))?;

        Self::from_extension(ext).ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Configuration file loader
///
/// Every format is flattened to one level of normalized keys, so
/// `[main] package = "x"` in TOML, `{"main": {"package": "x"}}` in JSON and
/// `main.package=x` in a properties file all load as `main_package`.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        FileFormat::from_path(path).map(Self::new)
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Map<String, Value>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e)))?;

        self.parse(&content)
    }

    /// Parse configuration from a string into flattened, normalized keys.
    pub fn parse(&self, content: &str) -> Result<Map<String, Value>> {
        let value = match self.format {
            FileFormat::Json => parse_json(content)?,
            FileFormat::Toml => parse_toml(content)?,
            FileFormat::Properties => parse_properties(content),
        };

        let Value::Object(root) = value else {
            return Err(ConfigError::ParseError("configuration root must be a table".to_string()));
        };

        let mut flat = Map::new();
        flatten("", root, &mut flat);
        Ok(flat)
    }
}

fn parse_json(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
}

fn parse_toml(content: &str) -> Result<Value> {
    let toml_value: toml::Value =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(toml_value).map_err(|e| ConfigError::SerializationError(e.to_string()))
}

fn parse_properties(content: &str) -> Value {
    let mut map = Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let separator = line.find(['=', ':']);
        if let Some(pos) = separator {
            let key = line[..pos].trim();
            let value = line[pos + 1..].trim().trim_matches('"').trim_matches('\'');
            if !key.is_empty() {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    Value::Object(map)
}

fn flatten(prefix: &str, map: Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            normalize_key(&key)
        } else {
            format!("{}_{}", prefix, normalize_key(&key))
        };
        match value {
            Value::Object(nested) => flatten(&key, nested, out),
            other => {
                out.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_nested() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader
            .parse(r#"{"main": {"package": "com.acme"}, "suffix-controller": "Handler"}"#)
            .unwrap();

        assert_eq!(result.get("main_package"), Some(&Value::from("com.acme")));
        assert_eq!(result.get("suffix_controller"), Some(&Value::from("Handler")));
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            packages_style = "nested"

            [alias.controllers]
            package = "com.acme.web"
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result.get("packages_style"), Some(&Value::from("nested")));
        assert_eq!(result.get("alias_controllers_package"), Some(&Value::from("com.acme.web")));
    }

    #[test]
    fn test_parse_properties() {
        let loader = ConfigLoader::new(FileFormat::Properties);
        let props = r#"
            # resolver
            main.package=com.acme
            ! legacy comment
            packages.style: NESTED
            suffix.serializer = "Writer"
        "#;

        let result = loader.parse(props).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.get("main_package"), Some(&Value::from("com.acme")));
        assert_eq!(result.get("packages_style"), Some(&Value::from("NESTED")));
        assert_eq!(result.get("suffix_serializer"), Some(&Value::from("Writer")));
    }

    #[test]
    fn test_parse_rejects_non_table_root() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(matches!(loader.parse("[1, 2]"), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("properties"), Some(FileFormat::Properties));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Properties));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert_eq!(FileFormat::from_path("conf/serval.toml").unwrap(), FileFormat::Toml);
        assert!(FileFormat::from_path("serval").is_err());
    }
}
