// SPDX-License-Identifier: MIT OR Apache-2.0

//! Accessor assembling raw documents from flat property sources.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, RawDocument, Result, ShapeId};
use crate::ports::{ConfigAccessor, ConfigSource};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Resolves raw documents by merging [`ConfigSource`]s.
///
/// Sources are consulted in priority order (highest first); for a key defined
/// by several sources the highest-priority value wins. A namespace prefix keeps
/// only the keys below it, with the prefix stripped.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::{EnvVarAdapter, PropertyAccessor};
/// use livecfg::domain::ShapeId;
/// use livecfg::ports::ConfigAccessor;
/// use serde::Deserialize;
/// use std::collections::HashMap;
///
/// #[derive(Deserialize)]
/// struct Database {
///     host: String,
///     port: u16,
/// }
///
/// let mut values = HashMap::new();
/// values.insert("database.host".to_string(), "localhost".to_string());
/// values.insert("database.port".to_string(), "5432".to_string());
///
/// let accessor = PropertyAccessor::new().with_source(Box::new(EnvVarAdapter::with_values(values)));
/// let db: Database = accessor
///     .probe_raw(&ShapeId::new("db"), Some("database"))
///     .unwrap()
///     .deserialize()
///     .unwrap();
/// assert_eq!(db.port, 5432);
/// ```
#[derive(Default)]
pub struct PropertyAccessor {
    /// Sources kept in priority order (highest first)
    sources: RwLock<Vec<Box<dyn ConfigSource>>>,
}

impl PropertyAccessor {
    /// Creates an accessor with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source and returns the accessor.
    pub fn with_source(self, source: Box<dyn ConfigSource>) -> Self {
        self.add_source(source);
        self
    }

    /// Adds a source, keeping the list sorted by priority.
    pub fn add_source(&self, source: Box<dyn ConfigSource>) {
        let mut sources = self.write_sources();
        sources.push(source);
        sources.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Names of the sources in the order they are consulted.
    pub fn source_names(&self) -> Vec<String> {
        self.read_sources()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Reloads every source. Failures are logged and the source keeps its
    /// previous data.
    pub fn reload(&self) {
        for source in self.write_sources().iter_mut() {
            if let Err(e) = source.reload() {
                tracing::warn!("Failed to reload source '{}': {}", source.name(), e);
            }
        }
    }

    /// Merged properties, optionally scoped to `prefix` (prefix stripped).
    pub fn properties(&self, prefix: Option<&str>) -> Result<Vec<(ConfigKey, ConfigValue)>> {
        self.merge(prefix, |source, key| source.get(key))
    }

    /// Merged typed scalars, optionally scoped to `prefix` (prefix stripped).
    ///
    /// Values come from [`ConfigSource::get_scalar`], so a source backed by a
    /// typed format keeps a quoted `"1.0"` as a string.
    pub fn scalars(&self, prefix: Option<&str>) -> Result<Vec<(ConfigKey, Value)>> {
        self.merge(prefix, |source, key| source.get_scalar(key))
    }

    fn merge<V, F>(&self, prefix: Option<&str>, read: F) -> Result<Vec<(ConfigKey, V)>>
    where
        F: Fn(&dyn ConfigSource, &ConfigKey) -> Result<Option<V>>,
    {
        let mut merged: BTreeMap<ConfigKey, V> = BTreeMap::new();

        for source in self.read_sources().iter() {
            let source = source.as_ref();
            let keys = source.all_keys().map_err(|e| unavailable(source, e))?;
            for key in keys {
                let relative = match prefix {
                    Some(prefix) => match key.strip_namespace(prefix) {
                        Some(relative) => relative,
                        None => continue,
                    },
                    None => key.clone(),
                };
                if merged.contains_key(&relative) {
                    continue;
                }
                match read(source, &key).map_err(|e| unavailable(source, e))? {
                    Some(value) => {
                        merged.insert(relative, value);
                    }
                    None => {
                        tracing::debug!("Source '{}' listed '{}' but has no value", source.name(), key);
                    }
                }
            }
        }

        if let Some(prefix) = prefix {
            if merged.is_empty() {
                return Err(ConfigError::NotFound {
                    key: prefix.to_string(),
                });
            }
        }

        Ok(merged.into_iter().collect())
    }

    fn read_sources(&self) -> RwLockReadGuard<'_, Vec<Box<dyn ConfigSource>>> {
        match self.sources.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_sources(&self) -> RwLockWriteGuard<'_, Vec<Box<dyn ConfigSource>>> {
        match self.sources.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn unavailable(source: &dyn ConfigSource, err: ConfigError) -> ConfigError {
    match err {
        e @ ConfigError::SourceUnavailable { .. } => e,
        other => ConfigError::SourceUnavailable {
            source_name: source.name().to_string(),
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

impl ConfigAccessor for PropertyAccessor {
    fn name(&self) -> &str {
        "properties"
    }

    fn probe_raw(&self, shape: &ShapeId, prefix: Option<&str>) -> Result<RawDocument> {
        let scalars = self.scalars(prefix)?;
        tracing::debug!(
            "Resolved {} propert(ies) for '{}' under prefix {:?}",
            scalars.len(),
            shape,
            prefix
        );
        Ok(RawDocument::from_scalars(scalars))
    }
}

impl std::fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("sources", &self.source_names())
            .finish()
    }
}
