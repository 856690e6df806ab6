// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration provider traits.

use crate::domain::{ProviderId, Result, ShapeId};
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Bound satisfied by every public configuration type.
///
/// `PartialEq` drives change detection and must compare by value. `Debug` is
/// used when logging transitions.
pub trait PublicConfig: PartialEq + Debug + Send + Sync + 'static {}

impl<T> PublicConfig for T where T: PartialEq + Debug + Send + Sync + 'static {}

/// A cached, typed configuration value.
///
/// # Concurrency
///
/// All operations may run concurrently. Two first calls to `get_data` can both
/// probe and both store; `refresh` does not lock across its
/// read-compare-update sequence, so two concurrent refreshes that observe the
/// same change may each publish a change event.
pub trait ConfigProvider<T>: Send + Sync {
    /// Returns the cached value, probing and caching it on first use.
    fn get_data(&self) -> Result<Arc<T>>;

    /// Computes a fresh value without reading or writing the cache.
    fn probe(&self) -> Result<T>;

    /// Re-probes and, if the value differs from the cached one, replaces it and
    /// publishes a change event. Returns `true` when a change was published.
    fn refresh(&self) -> Result<bool>;
}

/// Type-erased view of a provider, as consumed by composite providers.
pub trait DependencyProvider: Send + Sync {
    /// Identity used to match change events to their origin.
    fn id(&self) -> ProviderId;

    /// The public shape this provider produces.
    fn shape(&self) -> &ShapeId;

    /// Name of the Rust type this provider produces.
    fn type_name(&self) -> &'static str;

    /// Probes a fresh value and returns it type-erased.
    fn probe_any(&self) -> Result<Box<dyn Any + Send>>;
}
