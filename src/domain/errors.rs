// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! Every failure surfaces synchronously to the immediate caller. Providers never
//! retry internally and a failed probe never touches an existing cached value.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without breaking
/// downstream matches.
///
/// # Examples
///
/// ```
/// use livecfg::domain::errors::ConfigError;
///
/// fn lookup() -> Result<String, ConfigError> {
///     Err(ConfigError::NotFound {
///         key: "database".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The accessor could not resolve the raw configuration from its backing store.
    #[error("Configuration source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        /// The name of the source that failed
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Nothing in the backing store matched the requested key or namespace.
    #[error("Configuration not found: {key}")]
    NotFound {
        /// The key or namespace prefix that was not found
        key: String,
    },

    /// A composite lookup asked for a shape none of the member providers produce.
    #[error("No provider is registered for shape '{requested}', available: [{}]", available.join(", "))]
    NoProviderForShape {
        /// The requested shape
        requested: String,
        /// Shapes produced by the member providers, in registration order
        available: Vec<String>,
    },

    /// A member produced the requested shape but its value is not of the requested type.
    #[error("Provider for shape '{shape}' does not produce a value of type {expected}")]
    ShapeTypeMismatch {
        /// The shape that was matched
        shape: String,
        /// The Rust type the caller asked for
        expected: String,
    },

    /// The caller-supplied raw-to-public builder failed.
    #[error("Failed to build public configuration '{shape}': {source}")]
    BuilderFailure {
        /// The public shape being built
        shape: String,
        /// The error returned by the builder
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse a configuration file or to deserialize a raw shape.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in a configuration watcher.
    #[error("Configuration watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a `SourceUnavailable` error without an underlying cause.
    pub fn source_unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a builder error, keeping it as the error source.
    pub fn builder_failure<E>(shape: impl Into<String>, err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ConfigError::BuilderFailure {
            shape: shape.into(),
            source: err.into(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
