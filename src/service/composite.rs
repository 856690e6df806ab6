// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider composing the values of several other providers.

use crate::domain::{ChangeEvent, ConfigError, ProviderId, RefreshSignal, Result, ShapeId};
use crate::ports::{
    ConfigChangeAware, ConfigEventManager, ConfigProvider, DependencyProvider, PublicConfig,
};
use crate::service::CachedValue;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type ComposeFn<T> = Box<dyn Fn(&ProviderLookup<'_>) -> Result<T> + Send + Sync>;

/// Lookup facade handed to a composite builder.
///
/// Each lookup scans the members in registration order, takes the first one
/// whose public shape matches, and probes it. Values are always fresh; member
/// caches are neither read nor written.
pub struct ProviderLookup<'a> {
    members: &'a [Arc<dyn DependencyProvider>],
}

impl<'a> ProviderLookup<'a> {
    pub(crate) fn new(members: &'a [Arc<dyn DependencyProvider>]) -> Self {
        Self { members }
    }

    /// Looks up the member producing `L` under its default shape id.
    pub fn get<L: Any>(&self) -> Result<L> {
        self.get_shape(&ShapeId::of::<L>())
    }

    /// Looks up the member registered under `shape` and reads it as `L`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoProviderForShape`] if no member produces `shape`;
    /// - [`ConfigError::ShapeTypeMismatch`] if the member's value is not an `L`;
    /// - whatever the member's probe fails with.
    pub fn get_shape<L: Any>(&self, shape: &ShapeId) -> Result<L> {
        let member = self
            .members
            .iter()
            .find(|m| m.shape() == shape)
            .ok_or_else(|| ConfigError::NoProviderForShape {
                requested: shape.to_string(),
                available: self.shapes().map(ToString::to_string).collect(),
            })?;

        member
            .probe_any()?
            .downcast::<L>()
            .map(|value| *value)
            .map_err(|_| ConfigError::ShapeTypeMismatch {
                shape: shape.to_string(),
                expected: std::any::type_name::<L>().to_string(),
            })
    }

    /// Shapes produced by the members, in registration order.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeId> + '_ {
        self.members.iter().map(|m| m.shape())
    }
}

/// Caches a value built from the current values of several member providers.
///
/// The composite does not own its members; it only probes them. It refreshes
/// on every [`RefreshSignal`] and on any [`ChangeEvent`] whose origin is one of
/// its direct members.
pub struct CompositeProvider<T> {
    id: ProviderId,
    members: Vec<Arc<dyn DependencyProvider>>,
    cache: CachedValue<T>,
    compose: ComposeFn<T>,
    events: Arc<dyn ConfigEventManager>,
}

impl<T: PublicConfig> CompositeProvider<T> {
    pub(crate) fn new<F>(
        members: Vec<Arc<dyn DependencyProvider>>,
        events: Arc<dyn ConfigEventManager>,
        shape: ShapeId,
        compose: F,
    ) -> Self
    where
        F: Fn(&ProviderLookup<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            id: ProviderId::next(),
            members,
            cache: CachedValue::new(shape),
            compose: Box::new(compose),
            events,
        }
    }

    /// This provider's identity.
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// The public shape this provider produces.
    pub fn shape(&self) -> &ShapeId {
        self.cache.shape()
    }

    /// Identities of the member providers, in registration order.
    pub fn member_ids(&self) -> Vec<ProviderId> {
        self.members.iter().map(|m| m.id()).collect()
    }

    /// Returns `true` once the cache slot holds a value.
    pub fn is_cached(&self) -> bool {
        self.cache.current().is_some()
    }

    fn compose_value(&self) -> Result<T> {
        (self.compose)(&ProviderLookup::new(&self.members))
    }
}

impl<T: PublicConfig> ConfigProvider<T> for CompositeProvider<T> {
    fn get_data(&self) -> Result<Arc<T>> {
        self.cache.get_or_populate(|| self.compose_value())
    }

    fn probe(&self) -> Result<T> {
        self.compose_value()
    }

    fn refresh(&self) -> Result<bool> {
        let Some((previous, current)) = self.cache.refresh_with(|| self.compose_value())? else {
            return Ok(false);
        };

        self.events.fire_change(ChangeEvent::new(
            self.id,
            None,
            self.shape().clone(),
            previous,
            current,
        ));
        Ok(true)
    }
}

impl<T: PublicConfig> DependencyProvider for CompositeProvider<T> {
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
        Ok(Box::new(self.compose_value()?))
    }
}

impl<T: PublicConfig> ConfigChangeAware for CompositeProvider<T> {
    fn on_config_changed(&self, event: &ChangeEvent) {
        if !self.members.iter().any(|m| m.id() == event.origin()) {
            return;
        }
        tracing::debug!(
            "{} ('{}') refreshing after member {} changed",
            self.id,
            self.shape(),
            event.origin()
        );
        if let Err(e) = self.refresh() {
            tracing::warn!(
                "Failed to refresh composite config '{}' after change from {}: {}",
                self.shape(),
                event.origin(),
                e
            );
        }
    }

    fn on_refresh(&self, _signal: &RefreshSignal) {
        if let Err(e) = self.refresh() {
            tracing::warn!("Failed to refresh composite config '{}': {}", self.shape(), e);
        }
    }
}

impl<T> fmt::Debug for CompositeProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeProvider")
            .field("id", &self.id)
            .field("shape", self.cache.shape())
            .field(
                "members",
                &self.members.iter().map(|m| m.shape()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
