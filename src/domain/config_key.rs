// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted configuration key newtype.
//!
//! Property sources expose flat keys such as `database.pool.size`. A namespace
//! prefix scopes a lookup to the keys below one dotted segment path.

use std::fmt;

/// A type-safe wrapper for dotted configuration keys.
///
/// # Examples
///
/// ```
/// use livecfg::domain::ConfigKey;
///
/// let key = ConfigKey::from("database.host");
/// assert_eq!(key.as_str(), "database.host");
/// assert_eq!(key.strip_namespace("database").unwrap().as_str(), "host");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the dot-separated segments of the key.
    ///
    /// ```
    /// use livecfg::domain::ConfigKey;
    ///
    /// let key = ConfigKey::from("a.b.c");
    /// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    /// ```
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Returns the key relative to `namespace`, or `None` if the key lies outside it.
    ///
    /// Matching is done on whole segments: `database.host` is inside `database`
    /// but `databases.host` is not. A key equal to the namespace yields an empty key.
    pub fn strip_namespace(&self, namespace: &str) -> Option<ConfigKey> {
        let namespace = namespace.trim_end_matches('.');
        if namespace.is_empty() {
            return Some(self.clone());
        }
        match self.0.strip_prefix(namespace) {
            Some("") => Some(ConfigKey(String::new())),
            Some(rest) => rest.strip_prefix('.').map(|r| ConfigKey(r.to_string())),
            None => None,
        }
    }

    /// Returns `true` if the key has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments().next().is_none()
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
