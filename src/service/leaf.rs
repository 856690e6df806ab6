// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider deriving a public value from one raw shape.

use crate::domain::{ChangeEvent, ProviderId, RefreshSignal, Result, ShapeId};
use crate::ports::{
    ConfigAccessor, ConfigChangeAware, ConfigEventManager, ConfigProvider, DependencyProvider,
    PublicConfig,
};
use crate::service::CachedValue;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type ProbeFn<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Caches the result of applying a builder to one raw configuration shape.
///
/// Every probe asks the accessor for the raw document of `raw_shape` under the
/// provider's prefix, deserializes it and applies the builder.
///
/// Created through [`ConfigProviderFactory`](crate::service::ConfigProviderFactory),
/// which also subscribes it to the event manager. Once subscribed it refreshes:
///
/// - on every [`RefreshSignal`];
/// - on a [`ChangeEvent`] from another provider that reads the same raw shape,
///   or that publishes the raw shape itself as its public value.
pub struct LeafProvider<T> {
    id: ProviderId,
    raw_shape: ShapeId,
    prefix: Option<String>,
    cache: CachedValue<T>,
    probe: ProbeFn<T>,
    events: Arc<dyn ConfigEventManager>,
}

impl<T: PublicConfig> LeafProvider<T> {
    pub(crate) fn new<R, F>(
        accessor: Arc<dyn ConfigAccessor>,
        events: Arc<dyn ConfigEventManager>,
        raw_shape: ShapeId,
        prefix: Option<String>,
        shape: ShapeId,
        builder: F,
    ) -> Self
    where
        R: DeserializeOwned + 'static,
        F: Fn(R) -> Result<T> + Send + Sync + 'static,
    {
        let probe_shape = raw_shape.clone();
        let probe_prefix = prefix.clone();
        let probe: ProbeFn<T> = Box::new(move || {
            let document = accessor.probe_raw(&probe_shape, probe_prefix.as_deref())?;
            let raw: R = document.deserialize()?;
            builder(raw)
        });

        Self {
            id: ProviderId::next(),
            raw_shape,
            prefix,
            cache: CachedValue::new(shape),
            probe,
            events,
        }
    }

    /// This provider's identity.
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// The raw shape this provider reads.
    pub fn raw_shape(&self) -> &ShapeId {
        &self.raw_shape
    }

    /// The namespace prefix used for raw lookups, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The public shape this provider produces.
    pub fn shape(&self) -> &ShapeId {
        self.cache.shape()
    }

    /// Returns `true` once the cache slot holds a value.
    pub fn is_cached(&self) -> bool {
        self.cache.current().is_some()
    }

    fn cascades_from(&self, event: &ChangeEvent) -> bool {
        if event.origin() == self.id {
            return false;
        }
        event.raw_shape() == Some(&self.raw_shape) || event.shape() == &self.raw_shape
    }
}

impl<T: PublicConfig> ConfigProvider<T> for LeafProvider<T> {
    fn get_data(&self) -> Result<Arc<T>> {
        self.cache.get_or_populate(|| (self.probe)())
    }

    fn probe(&self) -> Result<T> {
        (self.probe)()
    }

    fn refresh(&self) -> Result<bool> {
        let Some((previous, current)) = self.cache.refresh_with(|| (self.probe)())? else {
            return Ok(false);
        };

        self.events.fire_change(ChangeEvent::new(
            self.id,
            Some(self.raw_shape.clone()),
            self.shape().clone(),
            previous,
            current,
        ));
        Ok(true)
    }
}

impl<T: PublicConfig> DependencyProvider for LeafProvider<T> {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn shape(&self) -> &ShapeId {
        self.cache.shape()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn probe_any(&self) -> Result<Box<dyn Any + Send>> {
        Ok(Box::new((self.probe)()?))
    }
}

impl<T: PublicConfig> ConfigChangeAware for LeafProvider<T> {
    fn on_config_changed(&self, event: &ChangeEvent) {
        if !self.cascades_from(event) {
            return;
        }
        tracing::debug!(
            "{} ('{}') refreshing after change from {}",
            self.id,
            self.shape(),
            event.origin()
        );
        if let Err(e) = self.refresh() {
            tracing::warn!(
                "Failed to refresh config '{}' after change from {}: {}",
                self.shape(),
                event.origin(),
                e
            );
        }
    }

    fn on_refresh(&self, _signal: &RefreshSignal) {
        if let Err(e) = self.refresh() {
            tracing::warn!("Failed to refresh config '{}': {}", self.shape(), e);
        }
    }
}

impl<T> fmt::Debug for LeafProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafProvider")
            .field("id", &self.id)
            .field("raw_shape", &self.raw_shape)
            .field("prefix", &self.prefix)
            .field("shape", self.cache.shape())
            .finish_non_exhaustive()
    }
}
