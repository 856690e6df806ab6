// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer: concrete accessors, property sources, event bus and watchers.
//!
//! Property sources implement [`ConfigSource`](crate::ports::ConfigSource) and
//! are merged by the [`PropertyAccessor`]. The [`StaticAccessor`] serves a
//! YAML tree held in memory.

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "env")]
pub mod env_var;
pub mod event_bus;
pub mod prefix_registry;
pub mod property_accessor;
pub mod static_accessor;
pub mod watchers;
#[cfg(feature = "yaml")]
pub mod yaml_file;

#[cfg(feature = "cli")]
pub use cli::CommandLineAdapter;
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
pub use event_bus::InMemoryEventBus;
pub use prefix_registry::PrefixRegistry;
pub use property_accessor::PropertyAccessor;
pub use static_accessor::StaticAccessor;
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileAdapter, YamlParser};
