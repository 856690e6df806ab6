// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher trait for backing stores that can change at runtime.
//!
//! A watcher only reports that something changed. Turning that into provider
//! refreshes is the job of [`RefreshTrigger`](crate::service::RefreshTrigger).

use crate::domain::{ConfigKey, Result};
use std::sync::Arc;

/// Callback invoked with the key (or file path) that changed.
pub type ChangeCallback = Arc<dyn Fn(ConfigKey) + Send + Sync>;

/// Monitors a backing store and invokes a callback on change.
///
/// # Examples
///
/// ```rust
/// use livecfg::ports::{ChangeCallback, ConfigWatcher};
/// use livecfg::domain::Result;
///
/// struct Manual(Option<ChangeCallback>);
///
/// impl ConfigWatcher for Manual {
///     fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
///         self.0 = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.0 = None;
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigWatcher: Send + Sync {
    /// Starts watching. The callback should return quickly; it runs on the
    /// watcher's own thread.
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching and releases any resources held by the watcher.
    fn stop(&mut self) -> Result<()>;
}
