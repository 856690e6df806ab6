// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat configuration value as exposed by property sources.
//!
//! Sources report every value as a string. When a raw document is assembled
//! the string is re-typed as a YAML scalar, so `"42"` deserializes into an
//! integer field and `"true"` into a boolean one.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

/// A configuration value read from a property source.
///
/// # Examples
///
/// ```
/// use livecfg::domain::ConfigValue;
///
/// let value = ConfigValue::from("42");
/// assert_eq!(value.as_str(), "42");
/// assert_eq!(value.to_scalar(), serde_yaml::Value::from(42));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue(String);

impl ConfigValue {
    /// Creates a new `ConfigValue` from a `String`.
    pub fn new(value: String) -> Self {
        ConfigValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the value into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Re-types the value as a YAML scalar.
    ///
    /// Booleans, numbers and `null`/`~` keep their YAML meaning. A quoted
    /// scalar (`'01234'`, `"true"`) becomes the unquoted string. Anything else,
    /// including text that would parse as a YAML collection, stays a string.
    pub fn to_scalar(&self) -> Value {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return Value::String(self.0.clone());
        }
        let quoted = trimmed.starts_with('\'') || trimmed.starts_with('"');
        match serde_yaml::from_str::<Value>(&self.0) {
            Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => v,
            Ok(Value::String(unquoted)) if quoted => Value::String(unquoted),
            _ => Value::String(self.0.clone()),
        }
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(s.to_string())
    }
}

impl From<ConfigValue> for String {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
