// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live, typed configuration delivered from raw configuration sources.
//!
//! A provider turns a raw configuration shape (anything `serde` can
//! deserialize) into a public configuration value through a builder function,
//! caches the result, and re-derives it on request. When the re-derived value
//! differs from the cached one the cache is swapped and a change event is
//! published, so dependent providers can refresh in turn.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: shape ids, raw documents, change events and errors
//! - **Ports**: traits at the seams (`ConfigAccessor`, `ConfigProvider`,
//!   `ConfigEventManager`, `PrefixResolver`, `ConfigSource`, `ConfigWatcher`)
//! - **Adapters**: property sources (env vars, YAML files, CLI arguments), the
//!   property and static accessors, the in-memory event bus and file watching
//! - **Service**: the shared cache, leaf and composite providers, and the
//!   factory that creates and subscribes them
//!
//! # Feature Flags
//!
//! - `yaml`: YAML file source (default)
//! - `env`: environment variable source (default)
//! - `cli`: command-line argument source (default)
//! - `reload`: file watching with `notify`
//! - `full`: all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use livecfg::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct RawServer {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Endpoint(String);
//!
//! # fn main() -> livecfg::domain::Result<()> {
//! let factory = ConfigProviderFactory::builder()
//!     .with_cli_args(vec!["--server.host=localhost", "--server.port=8080"])
//!     .with_prefix::<RawServer>("server")
//!     .build()?;
//!
//! let endpoint = factory
//!     .leaf::<RawServer>()
//!     .build(|raw| Endpoint(format!("{}:{}", raw.host, raw.port)));
//!
//! assert_eq!(*endpoint.get_data()?, Endpoint("localhost:8080".to_string()));
//! assert!(!endpoint.refresh()?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
pub mod prelude {
    pub use crate::adapters::{InMemoryEventBus, PrefixRegistry, PropertyAccessor, StaticAccessor};
    pub use crate::domain::{
        ChangeEvent, ConfigError, ConfigKey, ConfigValue, ProviderId, RawDocument, RefreshSignal,
        Result, ShapeId,
    };
    pub use crate::ports::{
        ConfigAccessor, ConfigChangeAware, ConfigEventManager, ConfigProvider, ConfigSource,
        ConfigWatcher, DependencyProvider, PrefixResolver,
    };
    pub use crate::service::{
        CompositeProvider, ConfigProviderFactory, DelegatingProvider, LeafProvider, ProviderLookup,
    };

    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineAdapter;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
