// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable property source.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, RwLock};

/// Maximum length for environment variable names
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values
const MAX_ENV_VALUE_LEN: usize = 1024 * 1024;

type Snapshot = Arc<HashMap<String, String>>;

/// Property source reading process environment variables.
///
/// Variable names are turned into dotted keys: an optional prefix is stripped,
/// the name is lowercased and underscores become dots, so with the prefix
/// `APP_` the variable `APP_DATABASE_HOST` is exposed as `database.host`.
///
/// The environment is read on first use and kept until
/// [`reload`](ConfigSource::reload) is called.
///
/// # Priority
///
/// Environment variables have priority 2: they override files and are
/// overridden by command-line arguments.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::EnvVarAdapter;
/// use livecfg::ports::ConfigSource;
///
/// let adapter = EnvVarAdapter::with_prefix("MYAPP_");
/// assert_eq!(adapter.priority(), 2);
/// ```
#[derive(Debug)]
pub struct EnvVarAdapter {
    prefix: Option<String>,
    lowercase_keys: bool,
    replace_underscores: bool,
    /// `false` for adapters built from fixed values; those never re-read the environment
    from_process: bool,
    snapshot: RwLock<Option<Snapshot>>,
}

impl EnvVarAdapter {
    /// Reads every environment variable of the process.
    pub fn new() -> Self {
        Self {
            prefix: None,
            lowercase_keys: true,
            replace_underscores: true,
            from_process: true,
            snapshot: RwLock::new(None),
        }
    }

    /// Reads only variables starting with `prefix`, stripping it from the key.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Uses the given key/value pairs instead of the process environment.
    ///
    /// Keys are taken as-is; no prefix or name transformation is applied.
    ///
    /// ```rust
    /// use livecfg::adapters::EnvVarAdapter;
    /// use livecfg::domain::ConfigKey;
    /// use livecfg::ports::ConfigSource;
    /// use std::collections::HashMap;
    ///
    /// let mut values = HashMap::new();
    /// values.insert("server.port".to_string(), "8080".to_string());
    ///
    /// let adapter = EnvVarAdapter::with_values(values);
    /// let port = adapter.get(&ConfigKey::from("server.port")).unwrap();
    /// assert_eq!(port.unwrap().as_str(), "8080");
    /// ```
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            prefix: None,
            lowercase_keys: false,
            replace_underscores: false,
            from_process: false,
            snapshot: RwLock::new(Some(Arc::new(values))),
        }
    }

    /// Sets whether variable names are lowercased (default `true`).
    pub fn lowercase_keys(mut self, enabled: bool) -> Self {
        self.lowercase_keys = enabled;
        self
    }

    /// Sets whether underscores become dots (default `true`).
    pub fn replace_underscores(mut self, enabled: bool) -> Self {
        self.replace_underscores = enabled;
        self
    }

    fn key_for(&self, name: &str) -> Option<String> {
        let name = match &self.prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str())?,
            None => name,
        };
        if name.is_empty() {
            return None;
        }
        let mut key = if self.lowercase_keys {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        if self.replace_underscores {
            key = key.replace('_', ".");
        }
        Some(key)
    }

    fn read_process(&self) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for (name, value) in env::vars() {
            if name.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable (name_len={}, value_len={})",
                    name.len(),
                    value.len()
                );
                continue;
            }
            if let Some(key) = self.key_for(&name) {
                values.insert(key, value);
            }
        }

        tracing::debug!(
            "Loaded {} environment variable(s) (prefix={:?})",
            values.len(),
            self.prefix
        );
        values
    }

    fn snapshot(&self) -> Snapshot {
        let cached = match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(snapshot) = cached {
            return snapshot;
        }

        let loaded = Arc::new(self.read_process());
        let mut slot = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(slot.get_or_insert(loaded))
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .snapshot()
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .snapshot()
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }

    fn reload(&mut self) -> Result<()> {
        if self.from_process {
            let slot = match self.snapshot.get_mut() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = None;
        }
        Ok(())
    }
}
