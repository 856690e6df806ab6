// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespace prefix lookup for raw shapes.

use crate::domain::ShapeId;

/// Maps a raw shape to the namespace prefix its properties live under.
///
/// `None` means the shape is read from the root of the backing store.
pub trait PrefixResolver: Send + Sync {
    /// Returns the prefix registered for `shape`, if any.
    fn resolve_prefix(&self, shape: &ShapeId) -> Option<String>;
}

/// Resolves every shape to the root namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrefix;

impl PrefixResolver for NoPrefix {
    fn resolve_prefix(&self, _shape: &ShapeId) -> Option<String> {
        None
    }
}
