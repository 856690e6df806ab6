// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process synchronous event bus.

use crate::domain::{ChangeEvent, RefreshSignal};
use crate::ports::{ConfigChangeAware, ConfigEventManager};
use std::sync::{Arc, RwLock, Weak};

/// Delivers events synchronously to every live subscriber.
///
/// Subscribers are held weakly. Publishing takes a snapshot of the live
/// subscribers, releases the lock, then calls each of them on the publishing
/// thread, so handlers may publish or subscribe again without deadlocking.
/// Dropped subscribers are pruned on the next publish.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::InMemoryEventBus;
/// use livecfg::domain::{ChangeEvent, RefreshSignal};
/// use livecfg::ports::{ConfigChangeAware, ConfigEventManager};
/// use std::sync::Arc;
///
/// struct Printer;
///
/// impl ConfigChangeAware for Printer {
///     fn on_config_changed(&self, event: &ChangeEvent) {
///         println!("changed: {}", event.shape());
///     }
///
///     fn on_refresh(&self, _signal: &RefreshSignal) {}
/// }
///
/// let bus = InMemoryEventBus::new();
/// let printer = Arc::new(Printer);
/// bus.subscribe(printer.clone());
/// assert_eq!(bus.subscriber_count(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: RwLock<Vec<Weak<dyn ConfigChangeAware>>>,
}

impl InMemoryEventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribers still alive.
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.read() {
            Ok(subscribers) => subscribers.iter().filter(|s| s.strong_count() > 0).count(),
            Err(_) => 0,
        }
    }

    fn live_subscribers(&self) -> Vec<Arc<dyn ConfigChangeAware>> {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|s| s.strong_count() > 0);
        subscribers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl ConfigEventManager for InMemoryEventBus {
    fn fire_change(&self, event: ChangeEvent) {
        let subscribers = self.live_subscribers();
        tracing::debug!(
            "Delivering change of '{}' from {} to {} subscriber(s)",
            event.shape(),
            event.origin(),
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber.on_config_changed(&event);
        }
    }

    fn fire_refresh(&self, signal: RefreshSignal) {
        let subscribers = self.live_subscribers();
        tracing::debug!(
            "Delivering refresh signal to {} subscriber(s)",
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber.on_refresh(&signal);
        }
    }

    fn subscribe(&self, subscriber: Arc<dyn ConfigChangeAware>) {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.push(Arc::downgrade(&subscriber));
    }
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProviderId, ShapeId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        changes: Mutex<Vec<ProviderId>>,
        refreshes: AtomicUsize,
    }

    impl ConfigChangeAware for Recorder {
        fn on_config_changed(&self, event: &ChangeEvent) {
            self.changes.lock().unwrap().push(event.origin());
        }

        fn on_refresh(&self, _signal: &RefreshSignal) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn event(origin: ProviderId) -> ChangeEvent {
        ChangeEvent::new(
            origin,
            None,
            ShapeId::new("test"),
            Arc::new(1u8),
            Arc::new(2u8),
        )
    }

    #[test]
    fn test_every_subscriber_receives_every_event() {
        let bus = InMemoryEventBus::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        bus.subscribe(a.clone());
        bus.subscribe(b.clone());

        let origin = ProviderId::next();
        bus.fire_change(event(origin));
        bus.fire_refresh(RefreshSignal);

        for recorder in [&a, &b] {
            assert_eq!(*recorder.changes.lock().unwrap(), vec![origin]);
            assert_eq!(recorder.refreshes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let bus = InMemoryEventBus::new();
        let kept = Arc::new(Recorder::default());
        let dropped = Arc::new(Recorder::default());
        bus.subscribe(kept.clone());
        bus.subscribe(dropped.clone());
        assert_eq!(bus.subscriber_count(), 2);

        drop(dropped);
        bus.fire_refresh(RefreshSignal);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.refreshes.load(Ordering::SeqCst), 1);
    }

    struct Republisher {
        bus: Arc<InMemoryEventBus>,
        fired: AtomicUsize,
    }

    impl ConfigChangeAware for Republisher {
        fn on_config_changed(&self, _event: &ChangeEvent) {}

        fn on_refresh(&self, _signal: &RefreshSignal) {
            if self.fired.fetch_add(1, Ordering::SeqCst) == 0 {
                self.bus.fire_change(event(ProviderId::next()));
            }
        }
    }

    #[test]
    fn test_nested_publish_does_not_deadlock() {
        let bus = Arc::new(InMemoryEventBus::new());
        let recorder = Arc::new(Recorder::default());
        let republisher = Arc::new(Republisher {
            bus: Arc::clone(&bus),
            fired: AtomicUsize::new(0),
        });
        bus.subscribe(republisher.clone());
        bus.subscribe(recorder.clone());

        bus.fire_refresh(RefreshSignal);

        assert_eq!(recorder.changes.lock().unwrap().len(), 1);
        assert_eq!(recorder.refreshes.load(Ordering::SeqCst), 1);
    }
}
