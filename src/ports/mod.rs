// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits are the seams between the provider core and everything it
//! treats as an external collaborator: the raw accessor, the event manager,
//! prefix lookup, and the flat property sources and watchers behind the
//! bundled accessor.

pub mod accessor;
pub mod events;
pub mod parser;
pub mod prefix;
pub mod provider;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use accessor::ConfigAccessor;
pub use events::{ConfigChangeAware, ConfigEventManager};
pub use parser::ConfigParser;
pub use prefix::{NoPrefix, PrefixResolver};
pub use provider::{ConfigProvider, DependencyProvider, PublicConfig};
pub use source::ConfigSource;
pub use watcher::{ChangeCallback, ConfigWatcher};
