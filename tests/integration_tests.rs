// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for provider caching, change detection and cascades.

mod common;

use common::{init_tracing, MockAccessor, RecordingEventManager};
use livecfg::prelude::*;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawDatabase {
    host: String,
    port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawCache {
    ttl: u32,
}

#[derive(Debug, PartialEq)]
struct DatabaseUrl(String);

#[derive(Debug, PartialEq)]
struct Summary(String);

const INITIAL: &str = "database:\n  host: db1\n  port: 5432\ncache:\n  ttl: 30\n";

fn setup(yaml: &str) -> (Arc<MockAccessor>, Arc<RecordingEventManager>, ConfigProviderFactory) {
    init_tracing();
    let accessor = MockAccessor::new(yaml);
    let events = RecordingEventManager::new();
    let factory = ConfigProviderFactory::builder()
        .with_accessor(accessor.clone())
        .with_event_manager(events.clone())
        .with_prefix::<RawDatabase>("database")
        .with_prefix::<RawCache>("cache")
        .build()
        .unwrap();
    (accessor, events, factory)
}

fn url_provider(factory: &ConfigProviderFactory) -> Arc<LeafProvider<DatabaseUrl>> {
    factory
        .leaf::<RawDatabase>()
        .build(|raw| DatabaseUrl(format!("postgres://{}:{}", raw.host, raw.port)))
}

#[test]
fn test_probe_is_idempotent() {
    let (_, _, factory) = setup(INITIAL);
    let provider = url_provider(&factory);

    let first = provider.probe().unwrap();
    let second = provider.probe().unwrap();
    assert_eq!(first, second);
    assert!(!provider.is_cached());
}

#[test]
fn test_lazy_population() {
    let (accessor, _, factory) = setup(INITIAL);
    let provider = url_provider(&factory);

    assert!(!provider.is_cached());
    assert_eq!(accessor.probe_count(), 0);

    let first = provider.get_data().unwrap();
    let second = provider.get_data().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(accessor.probe_count(), 1);
    assert_eq!(*first, DatabaseUrl("postgres://db1:5432".to_string()));
}

#[test]
fn test_unchanged_refresh_publishes_nothing() {
    let (_, events, factory) = setup(INITIAL);
    let provider = url_provider(&factory);

    provider.get_data().unwrap();
    assert!(!provider.refresh().unwrap());
    assert!(!provider.refresh().unwrap());
    assert!(events.changes().is_empty());
}

#[test]
fn test_change_detected_once() {
    let (accessor, _, factory) = setup(INITIAL);
    let provider = url_provider(&factory);
    let observed = Arc::new(ChangeObserver::default());
    factory.event_manager().subscribe(observed.clone());

    provider.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db2\n  port: 5432\n");

    assert!(provider.refresh().unwrap());
    assert!(!provider.refresh().unwrap());

    let seen = observed.urls();
    assert_eq!(
        seen,
        vec![(
            "postgres://db1:5432".to_string(),
            "postgres://db2:5432".to_string()
        )]
    );
    assert_eq!(
        *provider.get_data().unwrap(),
        DatabaseUrl("postgres://db2:5432".to_string())
    );
}

#[test]
fn test_refresh_on_empty_cache_populates_without_event() {
    let (accessor, events, factory) = setup(INITIAL);
    let provider = url_provider(&factory);

    assert!(!provider.refresh().unwrap());
    assert!(provider.is_cached());
    assert_eq!(accessor.probe_count(), 2);
    assert!(events.changes().is_empty());
}

#[test]
fn test_failed_probe_keeps_cache() {
    let (accessor, events, factory) = setup(INITIAL);
    let provider = url_provider(&factory);
    let before = provider.get_data().unwrap();

    accessor.set_failing(true);
    let err = provider.refresh().unwrap_err();
    assert!(matches!(err, ConfigError::SourceUnavailable { .. }));

    let after = provider.get_data().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(events.changes().is_empty());
}

#[test]
fn test_failed_first_access_leaves_slot_empty() {
    let (accessor, _, factory) = setup(INITIAL);
    let provider = url_provider(&factory);

    accessor.set_failing(true);
    assert!(provider.get_data().is_err());
    assert!(!provider.is_cached());

    accessor.set_failing(false);
    assert!(provider.get_data().is_ok());
}

#[test]
fn test_missing_namespace_is_not_found() {
    let (_, _, factory) = setup("cache:\n  ttl: 30\n");
    let provider = url_provider(&factory);
    assert!(matches!(
        provider.get_data(),
        Err(ConfigError::NotFound { key }) if key == "database"
    ));
}

#[test]
fn test_builder_failure_surfaces() {
    let (_, _, factory) = setup("database:\n  host: ''\n  port: 5432\n");
    let provider = factory
        .leaf::<RawDatabase>()
        .shape("database-url")
        .try_build(|raw| {
            if raw.host.is_empty() {
                return Err(format!("empty host for port {}", raw.port));
            }
            Ok(DatabaseUrl(raw.host))
        });

    match provider.get_data() {
        Err(ConfigError::BuilderFailure { shape, source }) => {
            assert_eq!(shape, "database-url");
            assert_eq!(source.to_string(), "empty host for port 5432");
        }
        other => panic!("expected builder failure, got {:?}", other),
    }
}

#[test]
fn test_composite_lookup_by_shape() {
    let (_, _, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl);

    let summary = factory
        .composite()
        .member(&url)
        .member(&ttl)
        .try_build(|lookup| -> Result<Summary> {
            let url: DatabaseUrl = lookup.get()?;
            let ttl: u32 = lookup.get()?;
            Ok(Summary(format!("{} ttl={}", url.0, ttl)))
        });

    assert_eq!(
        *summary.get_data().unwrap(),
        Summary("postgres://db1:5432 ttl=30".to_string())
    );
}

#[test]
fn test_composite_first_registered_member_wins() {
    let (_, _, factory) = setup(INITIAL);
    let primary = factory
        .leaf::<RawDatabase>()
        .shape("host")
        .build(|raw| raw.host);
    let shadow = factory
        .leaf::<RawCache>()
        .shape("host")
        .build(|_raw| "shadow".to_string());

    let composite = factory
        .composite()
        .member(&primary)
        .member(&shadow)
        .try_build(|lookup| lookup.get_shape::<String>(&ShapeId::new("host")));

    assert_eq!(*composite.get_data().unwrap(), "db1");
}

#[test]
fn test_composite_unknown_shape_lists_members() {
    let (_, _, factory) = setup(INITIAL);
    let x = factory.leaf::<RawDatabase>().shape("X").build(|raw| raw.port);
    let y = factory.leaf::<RawCache>().shape("Y").build(|raw| raw.ttl);

    let composite = factory
        .composite()
        .member(&x)
        .member(&y)
        .try_build(|lookup| lookup.get_shape::<u16>(&ShapeId::new("Z")));

    match composite.get_data() {
        Err(ConfigError::NoProviderForShape {
            requested,
            available,
        }) => {
            assert_eq!(requested, "Z");
            assert_eq!(available, vec!["X".to_string(), "Y".to_string()]);
        }
        other => panic!("expected NoProviderForShape, got {:?}", other),
    }
}

#[test]
fn test_composite_type_mismatch() {
    let (_, _, factory) = setup(INITIAL);
    let port = factory.leaf::<RawDatabase>().shape("port").build(|raw| raw.port);

    let composite = factory
        .composite()
        .member(&port)
        .try_build(|lookup| lookup.get_shape::<String>(&ShapeId::new("port")));

    assert!(matches!(
        composite.get_data(),
        Err(ConfigError::ShapeTypeMismatch { shape, .. }) if shape == "port"
    ));
}

#[test]
fn test_composite_probes_members_fresh() {
    let (accessor, _, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let composite = factory
        .composite()
        .member(&url)
        .try_build(|lookup| lookup.get::<DatabaseUrl>());

    url.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db9\n  port: 1\n");

    // The member's cache is stale, but the composite reads a fresh probe.
    assert_eq!(composite.get_data().unwrap().0, "postgres://db9:1");
    assert_eq!(url.get_data().unwrap().0, "postgres://db1:5432");
}

#[test]
fn test_sibling_cascade_on_same_raw_shape() {
    let (accessor, events, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let port = factory.leaf::<RawDatabase>().build(|raw| raw.port);

    url.get_data().unwrap();
    port.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db1\n  port: 6543\n");

    assert!(url.refresh().unwrap());
    assert_eq!(*port.get_data().unwrap(), 6543);
    assert_eq!(events.changes_from(port.id()), 1);
}

#[test]
fn test_no_cascade_across_raw_shapes() {
    let (accessor, events, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl);

    url.get_data().unwrap();
    ttl.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db2\n  port: 5432\ncache:\n  ttl: 60\n");

    assert!(url.refresh().unwrap());
    assert_eq!(*ttl.get_data().unwrap(), 30);
    assert_eq!(events.changes_from(ttl.id()), 0);
}

#[test]
fn test_raw_provider_change_cascades_to_readers() {
    let (accessor, _, factory) = setup(INITIAL);
    let raw = factory.raw::<RawCache>();
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl * 1000);

    raw.get_data().unwrap();
    ttl.get_data().unwrap();
    accessor.set_yaml("cache:\n  ttl: 45\n");

    assert!(raw.refresh().unwrap());
    assert_eq!(*ttl.get_data().unwrap(), 45_000);
}

#[test]
fn test_composite_refreshes_when_member_changes() {
    let (accessor, events, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl);
    let summary = factory
        .composite()
        .member(&url)
        .member(&ttl)
        .try_build(|lookup| -> Result<Summary> {
            let url: DatabaseUrl = lookup.get()?;
            let ttl: u32 = lookup.get()?;
            Ok(Summary(format!("{} ttl={}", url.0, ttl)))
        });

    url.get_data().unwrap();
    summary.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db3\n  port: 5432\ncache:\n  ttl: 30\n");

    assert!(url.refresh().unwrap());
    assert_eq!(summary.get_data().unwrap().0, "postgres://db3:5432 ttl=30");
    assert_eq!(events.changes_from(summary.id()), 1);
}

#[test]
fn test_composite_ignores_non_member_changes() {
    let (accessor, events, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl);
    let only_ttl = factory
        .composite()
        .member(&ttl)
        .try_build(|lookup| lookup.get::<u32>());

    url.get_data().unwrap();
    only_ttl.get_data().unwrap();
    accessor.set_yaml("database:\n  host: db4\n  port: 5432\ncache:\n  ttl: 90\n");

    // The url change is not from a member; the composite keeps its cached value.
    assert!(url.refresh().unwrap());
    assert_eq!(*only_ttl.get_data().unwrap(), 30);
    assert_eq!(events.changes_from(only_ttl.id()), 0);
}

#[test]
fn test_refresh_signal_refreshes_each_provider_once() {
    let (accessor, _, factory) = setup(INITIAL);
    let calls = Arc::new(AtomicUsize::new(0));

    let providers: Vec<Arc<LeafProvider<u16>>> = (0..3)
        .map(|_| {
            let calls = Arc::clone(&calls);
            factory.leaf::<RawDatabase>().build(move |raw| {
                calls.fetch_add(1, Ordering::SeqCst);
                raw.port
            })
        })
        .collect();
    for provider in &providers {
        provider.get_data().unwrap();
    }
    let probes_before = accessor.probe_count();
    calls.store(0, Ordering::SeqCst);

    factory.refresh_all();

    assert_eq!(calls.load(Ordering::SeqCst), providers.len());
    assert_eq!(accessor.probe_count() - probes_before, providers.len());
}

#[test]
fn test_refresh_signal_picks_up_changes() {
    let (accessor, events, factory) = setup(INITIAL);
    let url = url_provider(&factory);
    let ttl = factory.leaf::<RawCache>().build(|raw| raw.ttl);
    url.get_data().unwrap();
    ttl.get_data().unwrap();

    accessor.set_yaml("database:\n  host: db5\n  port: 5432\ncache:\n  ttl: 10\n");
    factory.refresh_all();

    assert_eq!(url.get_data().unwrap().0, "postgres://db5:5432");
    assert_eq!(*ttl.get_data().unwrap(), 10);
    assert_eq!(events.refresh_count(), 1);
    assert_eq!(events.changes_from(ttl.id()), 1);
}

#[test]
fn test_dropped_providers_are_unsubscribed() {
    let (_, events, factory) = setup(INITIAL);
    let kept = url_provider(&factory);
    {
        let _dropped = factory.leaf::<RawCache>().build(|raw| raw.ttl);
        assert_eq!(events.subscriber_count(), 2);
    }
    assert_eq!(events.subscriber_count(), 1);
    factory.refresh_all();
    assert!(kept.is_cached());
}

#[test]
fn test_delegating_provider_forwards() {
    let (accessor, _, factory) = setup(INITIAL);
    let delegating = DelegatingProvider::new(url_provider(&factory));

    assert_eq!(delegating.get_data().unwrap().0, "postgres://db1:5432");
    accessor.set_yaml("database:\n  host: db6\n  port: 5432\n");
    assert!(delegating.refresh().unwrap());
    assert_eq!(delegating.probe().unwrap().0, "postgres://db6:5432");
}

/// Records every database url transition it is told about.
#[derive(Default)]
struct ChangeObserver {
    seen: std::sync::Mutex<Vec<(String, String)>>,
}

impl ChangeObserver {
    fn urls(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ConfigChangeAware for ChangeObserver {
    fn on_config_changed(&self, event: &ChangeEvent) {
        if let (Some(previous), Some(current)) = (
            event.previous::<DatabaseUrl>(),
            event.current::<DatabaseUrl>(),
        ) {
            self.seen
                .lock()
                .unwrap()
                .push((previous.0.clone(), current.0.clone()));
        }
    }

    fn on_refresh(&self, _signal: &RefreshSignal) {}
}

#[test]
fn test_concurrent_reads_and_refreshes_see_valid_values() {
    const FIRST: &str = "database:\n  host: db1\n  port: 5432\n";
    const SECOND: &str = "database:\n  host: db2\n  port: 6543\n";

    let (accessor, _, factory) = setup(FIRST);
    let url = url_provider(&factory);
    let label = factory
        .composite()
        .member(&url)
        .try_build(|lookup| -> Result<Summary> {
            let url: DatabaseUrl = lookup.get()?;
            Ok(Summary(url.0))
        });

    let valid = [
        "postgres://db1:5432".to_string(),
        "postgres://db2:6543".to_string(),
    ];
    let observed = std::sync::Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..200 {
                accessor.set_yaml(if round % 2 == 0 { SECOND } else { FIRST });
            }
        });
        scope.spawn(|| {
            for _ in 0..50 {
                factory.refresh_all();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let current = url.get_data().unwrap();
                    url.refresh().unwrap();
                    let summary = label.get_data().unwrap();
                    let mut seen = observed.lock().unwrap();
                    seen.push(current.0.clone());
                    seen.push(summary.0.clone());
                }
            });
        }
    });

    let observed = observed.into_inner().unwrap();
    assert_eq!(observed.len(), 4 * 100 * 2);
    assert!(observed.iter().all(|value| valid.contains(value)));

    // Once writers are quiet, one refresh settles the cache on the current data.
    url.refresh().unwrap();
    label.refresh().unwrap();
    assert_eq!(*url.get_data().unwrap(), url.probe().unwrap());
    assert_eq!(*label.get_data().unwrap(), label.probe().unwrap());
}
