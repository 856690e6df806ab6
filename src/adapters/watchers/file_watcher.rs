// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for configuration files.

use crate::domain::{ConfigError, ConfigKey, Result};
use crate::ports::{ChangeCallback, ConfigWatcher};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches one configuration file and reports modifications.
///
/// The parent directory is watched so editors that replace the file on save
/// are still noticed. Events arriving within the debounce delay of the last
/// reported one are dropped. Pair it with
/// [`RefreshTrigger::callback`](crate::service::RefreshTrigger::callback) to
/// refresh providers whenever the file changes.
///
/// # Examples
///
/// ```rust,no_run
/// use livecfg::adapters::FileWatcher;
/// use livecfg::ports::ConfigWatcher;
/// use std::sync::Arc;
///
/// # fn main() -> livecfg::domain::Result<()> {
/// let mut watcher = FileWatcher::new("/etc/myapp/config.yaml", None)?;
/// watcher.watch(Arc::new(|key| println!("changed: {}", key)))?;
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    file_path: PathBuf,
    debounce_delay: Duration,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileWatcher {
    /// Creates a watcher for `path`. The file must exist.
    ///
    /// `debounce_delay` defaults to 500ms.
    pub fn new(path: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let requested = path.as_ref();
        let file_path = requested
            .canonicalize()
            .map_err(|e| ConfigError::WatcherError {
                message: format!("File does not exist: {}", requested.display()),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            file_path,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: Mutex::new(None),
        })
    }

    /// The watched file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns `true` while the watcher is running.
    pub fn is_watching(&self) -> bool {
        match self.watcher.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    fn slot(&mut self) -> &mut Option<RecommendedWatcher> {
        match self.watcher.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("file_path", &self.file_path)
            .field("debounce_delay", &self.debounce_delay)
            .field("watching", &self.is_watching())
            .finish()
    }
}

fn is_relevant(event: &Event, file_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    ) && event.paths.iter().any(|p| p == file_path)
}

impl ConfigWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.slot().is_some() {
            return Err(ConfigError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let file_path = self.file_path.clone();
        let debounce_delay = self.debounce_delay;
        let mut last_reported: Option<Instant> = None;

        let handler = move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("File watcher error for {}: {}", file_path.display(), e);
                    return;
                }
            };
            if !is_relevant(&event, &file_path) {
                return;
            }

            let now = Instant::now();
            if last_reported.is_some_and(|last| now.duration_since(last) < debounce_delay) {
                tracing::trace!("Debounced change to {}", file_path.display());
                return;
            }
            last_reported = Some(now);

            tracing::debug!("Detected change to {}", file_path.display());
            callback(ConfigKey::from(file_path.to_string_lossy().as_ref()));
        };

        let mut watcher = RecommendedWatcher::new(handler, notify::Config::default()).map_err(
            |e| ConfigError::WatcherError {
                message: format!("Failed to create file watcher: {}", e),
                source: Some(Box::new(e)),
            },
        )?;

        let directory = self
            .file_path
            .parent()
            .ok_or_else(|| ConfigError::WatcherError {
                message: format!("{} has no parent directory", self.file_path.display()),
                source: None,
            })?;
        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        tracing::info!("Watching {} for changes", self.file_path.display());
        *self.slot() = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.slot().take().is_some() {
            tracing::info!("Stopped watching {}", self.file_path.display());
        }
        Ok(())
    }
}
