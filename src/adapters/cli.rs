// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument property source.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::HashMap;

/// Property source built from command-line arguments.
///
/// Recognized forms:
/// - `--key=value`
/// - `--key value`
/// - `-k value` (single-character key)
///
/// A long option followed by another option, or by nothing, is a boolean
/// switch and reads as `"true"`. Positional arguments are ignored.
///
/// # Priority
///
/// Command-line arguments have priority 3 and override every other bundled source.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::CommandLineAdapter;
/// use livecfg::domain::ConfigKey;
/// use livecfg::ports::ConfigSource;
///
/// let adapter = CommandLineAdapter::from_args(vec!["--database.host=localhost", "--server.port", "8080"]);
/// let port = adapter.get(&ConfigKey::from("server.port")).unwrap().unwrap();
/// assert_eq!(port.as_str(), "8080");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLineAdapter {
    values: HashMap<String, String>,
}

impl CommandLineAdapter {
    /// Creates an adapter with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the given arguments (without the program name).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let mut values = HashMap::new();
        let mut iter = args.iter().map(|arg| arg.as_ref()).peekable();

        while let Some(arg) = iter.next() {
            let (key, long) = if let Some(long) = arg.strip_prefix("--") {
                if let Some((key, value)) = long.split_once('=') {
                    values.insert(key.to_string(), value.to_string());
                    continue;
                }
                (long, true)
            } else if let Some(short) = arg.strip_prefix('-').filter(|s| s.chars().count() == 1) {
                (short, false)
            } else {
                tracing::trace!("Ignoring positional argument '{}'", arg);
                continue;
            };

            if key.is_empty() {
                continue;
            }
            match iter.next_if(|next| !next.starts_with('-')) {
                Some(value) => {
                    values.insert(key.to_string(), value.to_string());
                }
                None if long => {
                    values.insert(key.to_string(), "true".to_string());
                }
                None => {}
            }
        }

        tracing::debug!("Parsed {} command-line propert(ies)", values.len());
        Self { values }
    }

    /// Parses the arguments of the running process, skipping the program name.
    pub fn from_env_args() -> Self {
        Self::from_args(std::env::args().skip(1))
    }
}

impl ConfigSource for CommandLineAdapter {
    fn name(&self) -> &str {
        "cli"
    }

    fn priority(&self) -> u8 {
        3
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }

    fn reload(&mut self) -> Result<()> {
        // Arguments are fixed for the lifetime of the process
        Ok(())
    }
}
