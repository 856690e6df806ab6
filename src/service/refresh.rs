// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridges watcher callbacks to refresh signals.

use crate::adapters::PropertyAccessor;
use crate::domain::{ConfigKey, RefreshSignal};
use crate::ports::{ChangeCallback, ConfigEventManager};
use std::sync::Arc;

/// Reloads property sources and broadcasts a [`RefreshSignal`].
///
/// Plug [`RefreshTrigger::callback`] into any
/// [`ConfigWatcher`](crate::ports::ConfigWatcher) to have every provider
/// re-probe when the watched store changes.
#[derive(Clone)]
pub struct RefreshTrigger {
    events: Arc<dyn ConfigEventManager>,
    accessor: Option<Arc<PropertyAccessor>>,
}

impl RefreshTrigger {
    /// Creates a trigger that only broadcasts.
    pub fn new(events: Arc<dyn ConfigEventManager>) -> Self {
        Self {
            events,
            accessor: None,
        }
    }

    /// Also reloads `accessor`'s sources before broadcasting.
    pub fn with_reloadable(mut self, accessor: Arc<PropertyAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Reloads (if configured) and fires one refresh signal.
    pub fn trigger(&self) {
        if let Some(accessor) = &self.accessor {
            accessor.reload();
        }
        self.events.fire_refresh(RefreshSignal);
    }

    /// Returns a watcher callback that calls [`RefreshTrigger::trigger`].
    pub fn callback(&self) -> ChangeCallback {
        let trigger = self.clone();
        Arc::new(move |key: ConfigKey| {
            tracing::info!("Change reported for '{}', refreshing configuration", key);
            trigger.trigger();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEventBus;
    use crate::domain::ChangeEvent;
    use crate::ports::ConfigChangeAware;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ConfigChangeAware for Counter {
        fn on_config_changed(&self, _event: &ChangeEvent) {}

        fn on_refresh(&self, _signal: &RefreshSignal) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_callback_fires_refresh_signal() {
        let bus = Arc::new(InMemoryEventBus::new());
        let counter = Arc::new(Counter::default());
        bus.subscribe(counter.clone());

        let callback = RefreshTrigger::new(bus).callback();
        callback(ConfigKey::from("/etc/app/config.yaml"));
        callback(ConfigKey::from("/etc/app/config.yaml"));

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
