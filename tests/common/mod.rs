// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared mocks for the integration tests.

#![allow(dead_code)]

use livecfg::adapters::{InMemoryEventBus, StaticAccessor};
use livecfg::domain::{
    ChangeEvent, ConfigError, ConfigKey, ConfigValue, ProviderId, RawDocument, RefreshSignal,
    Result, ShapeId,
};
use livecfg::ports::{ConfigAccessor, ConfigChangeAware, ConfigEventManager, ConfigSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Accessor over a replaceable YAML document that counts probes and can be
/// switched into a failing state.
#[derive(Debug)]
pub struct MockAccessor {
    inner: StaticAccessor,
    failing: AtomicBool,
    probes: AtomicUsize,
}

impl MockAccessor {
    /// Serves `yaml`.
    pub fn new(yaml: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticAccessor::from_yaml(yaml).unwrap(),
            failing: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
        })
    }

    /// Replaces the served document.
    pub fn set_yaml(&self, yaml: &str) {
        self.inner.set_yaml(yaml).unwrap();
    }

    /// Makes every following probe fail with `SourceUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of probes received, failed ones included.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl ConfigAccessor for MockAccessor {
    fn name(&self) -> &str {
        "mock"
    }

    fn probe_raw(&self, shape: &ShapeId, prefix: Option<&str>) -> Result<RawDocument> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfigError::source_unavailable("mock", "backing store offline"));
        }
        self.inner.probe_raw(shape, prefix)
    }
}

/// One change event as seen by the [`RecordingEventManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedChange {
    pub origin: ProviderId,
    pub shape: ShapeId,
}

/// Event manager that records everything it publishes and forwards it to an
/// [`InMemoryEventBus`].
#[derive(Debug, Default)]
pub struct RecordingEventManager {
    bus: InMemoryEventBus,
    changes: Mutex<Vec<RecordedChange>>,
    refreshes: AtomicUsize,
}

impl RecordingEventManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Change events published so far, in order.
    pub fn changes(&self) -> Vec<RecordedChange> {
        self.changes.lock().unwrap().clone()
    }

    /// Change events published by `origin`.
    pub fn changes_from(&self, origin: ProviderId) -> usize {
        self.changes()
            .iter()
            .filter(|c| c.origin == origin)
            .count()
    }

    /// Refresh signals published so far.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.changes.lock().unwrap().clear();
        self.refreshes.store(0, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

impl ConfigEventManager for RecordingEventManager {
    fn fire_change(&self, event: ChangeEvent) {
        self.changes.lock().unwrap().push(RecordedChange {
            origin: event.origin(),
            shape: event.shape().clone(),
        });
        self.bus.fire_change(event);
    }

    fn fire_refresh(&self, signal: RefreshSignal) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.bus.fire_refresh(signal);
    }

    fn subscribe(&self, subscriber: Arc<dyn ConfigChangeAware>) {
        self.bus.subscribe(subscriber);
    }
}

/// Property source over a shared map, so tests can edit values after the
/// source has been boxed into an accessor.
#[derive(Debug, Clone)]
pub struct MockConfigSource {
    name: String,
    priority: u8,
    values: Arc<RwLock<HashMap<String, String>>>,
    reloads: Arc<AtomicUsize>,
}

impl MockConfigSource {
    pub fn new(name: impl Into<String>, priority: u8) -> Self {
        Self {
            name: name.into(),
            priority,
            values: Arc::new(RwLock::new(HashMap::new())),
            reloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value; visible through every clone of this source.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().unwrap().insert(key.into(), value.into());
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl ConfigSource for MockConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .read()
            .unwrap()
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .read()
            .unwrap()
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }

    fn reload(&mut self) -> Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Creates a temporary YAML file, deleted when the handle is dropped.
pub fn create_temp_yaml(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}
