// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat property source trait.
//!
//! A `ConfigSource` exposes dotted keys and string values. The
//! [`PropertyAccessor`](crate::adapters::PropertyAccessor) merges several of
//! them into the raw documents that providers deserialize.

use crate::domain::{ConfigKey, ConfigValue, Result};
use serde_yaml::Value;

/// A source of flat configuration properties.
///
/// # Priority
///
/// When two sources define the same key, the one with the higher priority wins.
/// The bundled adapters use:
///
/// - **3**: Command-line arguments
/// - **2**: Environment variables
/// - **1**: Configuration files
///
/// # Examples
///
/// ```rust
/// use livecfg::ports::ConfigSource;
/// use livecfg::domain::{ConfigKey, ConfigValue, Result};
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn priority(&self) -> u8 {
///         1
///     }
///
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "app.name").then(|| ConfigValue::from("demo")))
///     }
///
///     fn all_keys(&self) -> Result<Vec<ConfigKey>> {
///         Ok(vec![ConfigKey::from("app.name")])
///     }
///
///     fn reload(&mut self) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let source = Fixed;
/// assert_eq!(source.get(&ConfigKey::from("app.name")).unwrap().unwrap().as_str(), "demo");
/// ```
pub trait ConfigSource: Send + Sync {
    /// Short identifier used in logs and errors ("env", "yaml-file", ...).
    fn name(&self) -> &str;

    /// Precedence of this source; higher wins.
    fn priority(&self) -> u8;

    /// Returns the value of `key`, `Ok(None)` if this source does not define it.
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Returns the value of `key` as a typed YAML scalar.
    ///
    /// String-only sources re-type their text with [`ConfigValue::to_scalar`].
    /// Sources reading a typed format override this to keep the original type,
    /// so a quoted `"01234"` stays a string.
    fn get_scalar(&self, key: &ConfigKey) -> Result<Option<Value>> {
        Ok(self.get(key)?.map(|value| value.to_scalar()))
    }

    /// Lists every key this source defines.
    fn all_keys(&self) -> Result<Vec<ConfigKey>>;

    /// Re-reads the backing data, for sources that can change at runtime.
    fn reload(&mut self) -> Result<()>;
}
