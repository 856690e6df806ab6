// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file property source.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource};
use directories::ProjectDirs;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Files larger than this are rejected (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SOURCE_NAME: &str = "yaml-file";

/// Flattens YAML documents into dotted keys.
///
/// Sequences are indexed (`hosts.0`, `hosts.1`) and `null` is kept as `~` so
/// it still reads back as a YAML null.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::YamlParser;
/// use livecfg::ports::ConfigParser;
///
/// let flat = YamlParser::new()
///     .parse("database:\n  host: localhost\n  port: 5432")
///     .unwrap();
/// assert_eq!(flat.get("database.host"), Some(&"localhost".to_string()));
/// assert_eq!(flat.get("database.port"), Some(&"5432".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    /// Parses `content` and flattens it, keeping each scalar's YAML type.
    ///
    /// A quoted `"1.0"` stays a string here, where the text form returned by
    /// [`ConfigParser::parse`] can no longer tell it apart from a number.
    pub fn parse_typed(&self, content: &str) -> Result<HashMap<String, Value>> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })?;

        let mut flat = HashMap::new();
        Self::flatten(&value, "", &mut flat);
        Ok(flat)
    }

    fn flatten(value: &Value, path: &str, out: &mut HashMap<String, Value>) {
        let child = |segment: &str| {
            if path.is_empty() {
                segment.to_string()
            } else {
                format!("{}.{}", path, segment)
            }
        };

        match value {
            Value::Mapping(map) => {
                for (key, val) in map {
                    let segment = match key {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    Self::flatten(val, &child(&segment), out);
                }
            }
            Value::Sequence(items) => {
                for (i, val) in items.iter().enumerate() {
                    Self::flatten(val, &child(&i.to_string()), out);
                }
            }
            Value::Tagged(tagged) => Self::flatten(&tagged.value, path, out),
            scalar => {
                out.insert(path.to_string(), scalar.clone());
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => "~".to_string(),
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .parse_typed(content)?
            .into_iter()
            .map(|(key, value)| (key, scalar_text(&value)))
            .collect())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Property source backed by a YAML file.
///
/// The file is read when the adapter is created and again on every
/// [`reload`](ConfigSource::reload). A failed reload keeps the previous values.
///
/// # Priority
///
/// YAML files have priority 1, the lowest of the bundled sources.
///
/// # Examples
///
/// ```rust,no_run
/// use livecfg::adapters::YamlFileAdapter;
///
/// let explicit = YamlFileAdapter::from_file("/etc/myapp/config.yaml").unwrap();
/// let discovered = YamlFileAdapter::from_default_location("myapp", "com.example").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    file_path: PathBuf,
    values: HashMap<String, Value>,
    parser: YamlParser,
}

impl YamlFileAdapter {
    /// Reads the YAML file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let requested = path.as_ref();
        let file_path = requested
            .canonicalize()
            .map_err(|e| unavailable(requested, "Invalid or inaccessible path", e))?;

        let parser = YamlParser::new();
        let values = read_flat(&parser, &file_path)?;
        tracing::info!(
            "Loaded {} key(s) from {}",
            values.len(),
            file_path.display()
        );

        Ok(Self {
            file_path,
            values,
            parser,
        })
    }

    /// Reads `config.yaml` from the platform configuration directory of the
    /// application (`~/.config/<app>` on Linux).
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Reads `filename` from the platform configuration directory of the application.
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            ConfigError::source_unavailable(SOURCE_NAME, "Failed to determine project directories")
        })?;
        Self::from_file(dirs.config_dir().join(filename))
    }

    /// Path of the backing file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn unavailable(path: &Path, what: &str, err: std::io::Error) -> ConfigError {
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>");
    ConfigError::SourceUnavailable {
        source_name: SOURCE_NAME.to_string(),
        message: format!("{}: {}", what, file),
        source: Some(Box::new(err)),
    }
}

fn read_flat(parser: &YamlParser, path: &Path) -> Result<HashMap<String, Value>> {
    let metadata =
        fs::metadata(path).map_err(|e| unavailable(path, "Failed to read file metadata", e))?;
    if metadata.len() > MAX_YAML_FILE_SIZE {
        return Err(ConfigError::source_unavailable(
            SOURCE_NAME,
            format!(
                "Configuration file too large: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_YAML_FILE_SIZE
            ),
        ));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| unavailable(path, "Failed to read configuration file", e))?;
    parser.parse_typed(&content)
}

impl ConfigSource for YamlFileAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn priority(&self) -> u8 {
        1
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::new(scalar_text(v))))
    }

    fn get_scalar(&self, key: &ConfigKey) -> Result<Option<Value>> {
        Ok(self.values.get(key.as_str()).cloned())
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }

    fn reload(&mut self) -> Result<()> {
        let values = read_flat(&self.parser, &self.file_path)?;
        tracing::debug!(
            "Reloaded {} key(s) from {}",
            values.len(),
            self.file_path.display()
        );
        self.values = values;
        Ok(())
    }
}
