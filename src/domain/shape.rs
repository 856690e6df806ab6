// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit identifiers for configuration shapes and providers.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Names a raw or public configuration shape.
///
/// Shapes are plain tokens chosen at registration time. Prefix lookup,
/// composite lookup and change-event matching all compare shape ids and never
/// inspect runtime types. [`ShapeId::of`] derives a default token from a Rust
/// type name.
///
/// # Examples
///
/// ```
/// use livecfg::domain::ShapeId;
///
/// struct Database;
///
/// let explicit = ShapeId::new("database");
/// let derived = ShapeId::of::<Database>();
///
/// assert_eq!(explicit.as_str(), "database");
/// assert!(derived.as_str().ends_with("Database"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(Cow<'static, str>);

impl ShapeId {
    /// Creates a shape id from any string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        ShapeId(name.into())
    }

    /// Derives the default shape id of `T` from its type name.
    pub fn of<T: ?Sized + 'static>() -> Self {
        ShapeId(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Returns the shape id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ShapeId {
    fn from(s: &'static str) -> Self {
        ShapeId(Cow::Borrowed(s))
    }
}

impl From<String> for ShapeId {
    fn from(s: String) -> Self {
        ShapeId(Cow::Owned(s))
    }
}

impl AsRef<str> for ShapeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-unique identity of a configuration provider.
///
/// Change events carry the id of the provider that published them so
/// subscribers can tell who changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u64);

impl ProviderId {
    /// Allocates the next unused id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ProviderId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}
