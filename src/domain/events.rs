// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change events and refresh signals exchanged over the event manager.

use crate::domain::{ProviderId, ShapeId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased public configuration value carried by a [`ChangeEvent`].
pub type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Records one provider's transition from a previous to a current value.
///
/// Built once by the provider that detected the change and never mutated.
/// Values are type-erased; use [`ChangeEvent::previous`] and
/// [`ChangeEvent::current`] to read them back as the public type.
///
/// # Examples
///
/// ```
/// use livecfg::domain::{ChangeEvent, ProviderId, ShapeId};
/// use std::sync::Arc;
///
/// let event = ChangeEvent::new(
///     ProviderId::next(),
///     None,
///     ShapeId::new("port"),
///     Arc::new(8080u16),
///     Arc::new(9090u16),
/// );
/// assert_eq!(event.previous::<u16>(), Some(&8080));
/// assert_eq!(event.current::<u16>(), Some(&9090));
/// assert_eq!(event.current::<String>(), None);
/// ```
#[derive(Clone)]
pub struct ChangeEvent {
    origin: ProviderId,
    raw_shape: Option<ShapeId>,
    shape: ShapeId,
    previous: ErasedValue,
    current: ErasedValue,
}

impl ChangeEvent {
    /// Creates a new change event.
    ///
    /// `raw_shape` is the raw shape the origin provider reads, or `None` for
    /// providers that do not read a raw shape directly (composites).
    pub fn new(
        origin: ProviderId,
        raw_shape: Option<ShapeId>,
        shape: ShapeId,
        previous: ErasedValue,
        current: ErasedValue,
    ) -> Self {
        Self {
            origin,
            raw_shape,
            shape,
            previous,
            current,
        }
    }

    /// The provider that published the event.
    pub fn origin(&self) -> ProviderId {
        self.origin
    }

    /// The raw shape read by the origin provider, if any.
    pub fn raw_shape(&self) -> Option<&ShapeId> {
        self.raw_shape.as_ref()
    }

    /// The public shape produced by the origin provider.
    pub fn shape(&self) -> &ShapeId {
        &self.shape
    }

    /// The value held before the change, if it is a `T`.
    pub fn previous<T: Any>(&self) -> Option<&T> {
        self.previous.downcast_ref::<T>()
    }

    /// The value held after the change, if it is a `T`.
    pub fn current<T: Any>(&self) -> Option<&T> {
        self.current.downcast_ref::<T>()
    }
}

impl fmt::Debug for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEvent")
            .field("origin", &self.origin)
            .field("raw_shape", &self.raw_shape)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Asks every subscribed provider to refresh its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSignal;
