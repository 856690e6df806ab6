// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live reload demo.
//!
//! Builds a database url provider and a composite status provider over a YAML
//! file, then rewrites the file and lets the file watcher refresh them.
//!
//! ```bash
//! cargo run --example live_reload --features reload
//! ```

use livecfg::prelude::*;
use serde::Deserialize;
use std::thread;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RawDatabase {
    host: String,
    port: u16,
    max_connections: u32,
}

#[derive(Debug, PartialEq)]
struct DatabaseUrl(String);

#[derive(Debug, PartialEq)]
struct PoolSize(u32);

#[derive(Debug, PartialEq)]
struct Status(String);

/// Prints every change it is told about.
struct Reporter;

impl ConfigChangeAware for Reporter {
    fn on_config_changed(&self, event: &ChangeEvent) {
        println!("changed {} (from {})", event.shape(), event.origin());
    }

    fn on_refresh(&self, _signal: &RefreshSignal) {
        println!("refresh requested");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        "database:\n  host: localhost\n  port: 5432\n  max_connections: 10\n",
    )?;

    let factory = ConfigProviderFactory::builder()
        .with_yaml_file(file.path())?
        .with_env_prefix("LIVECFG_DEMO_")
        .with_prefix::<RawDatabase>("database")
        .build()?;

    let url = factory
        .leaf::<RawDatabase>()
        .build(|raw| DatabaseUrl(format!("postgres://{}:{}", raw.host, raw.port)));
    let pool = factory
        .leaf::<RawDatabase>()
        .build(|raw| PoolSize(raw.max_connections));
    let status = factory
        .composite()
        .member(&url)
        .member(&pool)
        .build(|lookup| {
            let url: DatabaseUrl = lookup.get()?;
            let pool: PoolSize = lookup.get()?;
            Ok(Status(format!("{} with {} connections", url.0, pool.0)))
        });

    let reporter = std::sync::Arc::new(Reporter);
    factory.event_manager().subscribe(reporter.clone());

    println!("initial: {}", status.get_data()?.0);

    let mut watcher = FileWatcher::new(file.path(), Some(Duration::from_millis(200)))?;
    watcher.watch(factory.refresh_trigger().callback())?;

    thread::sleep(Duration::from_millis(200));
    std::fs::write(
        file.path(),
        "database:\n  host: db.internal\n  port: 5433\n  max_connections: 25\n",
    )?;
    thread::sleep(Duration::from_secs(1));

    println!("after edit: {}", status.get_data()?.0);
    watcher.stop()?;
    Ok(())
}
