// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot cache shared by every provider kind.

use crate::domain::{Result, ShapeId};
use crate::ports::PublicConfig;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Holds at most one public configuration value.
///
/// Loads and stores of the slot are atomic, so a reader sees either the old
/// value or the new one and never anything in between. Nothing locks across a
/// populate or a refresh: concurrent first reads may both probe and both
/// store, and concurrent refreshes may both report the same change.
#[derive(Debug)]
pub struct CachedValue<T> {
    shape: ShapeId,
    slot: ArcSwapOption<T>,
}

impl<T> CachedValue<T> {
    /// Creates an empty slot for values of `shape`.
    pub fn new(shape: ShapeId) -> Self {
        Self {
            shape,
            slot: ArcSwapOption::empty(),
        }
    }

    /// The public shape cached in this slot.
    pub fn shape(&self) -> &ShapeId {
        &self.shape
    }

    /// Returns the cached value, if any, without probing.
    pub fn current(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }
}

impl<T: PublicConfig> CachedValue<T> {
    /// Returns the cached value, or probes, stores and returns a fresh one.
    ///
    /// A failed probe leaves the slot empty.
    pub fn get_or_populate<F>(&self, probe: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(cached) = self.slot.load_full() {
            return Ok(cached);
        }

        let value = Arc::new(probe()?);
        self.slot.store(Some(Arc::clone(&value)));
        tracing::info!("Cached public config '{}': {:?}", self.shape, value);
        Ok(value)
    }

    /// Compares a fresh probe with the cached value and swaps it in if different.
    ///
    /// Returns `(previous, current)` when the slot changed. A failed probe leaves
    /// the slot untouched.
    pub fn refresh_with<F>(&self, probe: F) -> Result<Option<(Arc<T>, Arc<T>)>>
    where
        F: Fn() -> Result<T>,
    {
        let current = self.get_or_populate(&probe)?;
        let latest = probe()?;

        if *current == latest {
            tracing::debug!("No change detected for config '{}'", self.shape);
            return Ok(None);
        }

        let latest = Arc::new(latest);
        self.slot.store(Some(Arc::clone(&latest)));
        tracing::info!(
            "Configuration change detected for '{}', previous: {:?}, current: {:?}",
            self.shape,
            current,
            latest
        );
        Ok(Some((current, latest)))
    }
}
