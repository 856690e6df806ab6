// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration-time mapping from raw shapes to namespace prefixes.

use crate::domain::ShapeId;
use crate::ports::PrefixResolver;
use std::collections::HashMap;

/// Explicit table of namespace prefixes, keyed by raw shape.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::PrefixRegistry;
/// use livecfg::domain::ShapeId;
/// use livecfg::ports::PrefixResolver;
///
/// struct RawDatabase;
///
/// let registry = PrefixRegistry::new()
///     .register::<RawDatabase>("database")
///     .register_shape("cache", "app.cache");
///
/// assert_eq!(
///     registry.resolve_prefix(&ShapeId::of::<RawDatabase>()),
///     Some("database".to_string())
/// );
/// assert_eq!(registry.resolve_prefix(&ShapeId::new("other")), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixRegistry {
    prefixes: HashMap<ShapeId, String>,
}

impl PrefixRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `prefix` with the default shape id of `R`.
    pub fn register<R: 'static>(self, prefix: impl Into<String>) -> Self {
        self.register_shape(ShapeId::of::<R>(), prefix)
    }

    /// Associates `prefix` with an explicit shape id.
    ///
    /// Registering the same shape twice keeps the last prefix.
    pub fn register_shape(mut self, shape: impl Into<ShapeId>, prefix: impl Into<String>) -> Self {
        self.insert(shape.into(), prefix.into());
        self
    }

    /// In-place variant of [`PrefixRegistry::register_shape`].
    pub fn insert(&mut self, shape: ShapeId, prefix: String) {
        if let Some(previous) = self.prefixes.insert(shape.clone(), prefix) {
            tracing::debug!("Replacing prefix '{}' registered for '{}'", previous, shape);
        }
    }

    /// Number of registered shapes.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl PrefixResolver for PrefixRegistry {
    fn resolve_prefix(&self, shape: &ShapeId) -> Option<String> {
        self.prefixes.get(shape).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RawServer;

    #[test]
    fn test_register_by_type_and_by_shape() {
        let registry = PrefixRegistry::new()
            .register::<RawServer>("server")
            .register_shape("db", "database");

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.resolve_prefix(&ShapeId::of::<RawServer>()).as_deref(),
            Some("server")
        );
        assert_eq!(
            registry.resolve_prefix(&ShapeId::new("db")).as_deref(),
            Some("database")
        );
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = PrefixRegistry::new()
            .register_shape("db", "old")
            .register_shape("db", "new");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.resolve_prefix(&ShapeId::new("db")).as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_unregistered_shape_has_no_prefix() {
        assert!(PrefixRegistry::new().is_empty());
        assert_eq!(PrefixRegistry::new().resolve_prefix(&ShapeId::new("x")), None);
    }
}
