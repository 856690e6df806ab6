// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! This module contains the types shared by every other layer: keys and values
//! of flat property sources, the raw document assembled from them, shape and
//! provider identifiers, change events and the error type.

pub mod config_key;
pub mod config_value;
pub mod errors;
pub mod events;
pub mod raw_document;
pub mod shape;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use events::{ChangeEvent, ErasedValue, RefreshSignal};
pub use raw_document::RawDocument;
pub use shape::{ProviderId, ShapeId};
