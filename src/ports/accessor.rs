// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw configuration accessor trait.

use crate::domain::{RawDocument, Result, ShapeId};

/// Resolves raw configuration from a backing store.
///
/// Providers call the accessor on every probe, so implementations must be
/// idempotent and safe to call concurrently. Calls are synchronous and are
/// expected to be bounded; timeouts and retries are the accessor's own concern.
///
/// # Errors
///
/// Implementations report an unreachable store as
/// [`ConfigError::SourceUnavailable`](crate::domain::ConfigError::SourceUnavailable)
/// and an empty namespace as
/// [`ConfigError::NotFound`](crate::domain::ConfigError::NotFound). Providers
/// pass both through unchanged.
///
/// # Examples
///
/// ```rust
/// use livecfg::domain::{RawDocument, Result, ShapeId};
/// use livecfg::ports::ConfigAccessor;
///
/// struct Constant;
///
/// impl ConfigAccessor for Constant {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     fn probe_raw(&self, _shape: &ShapeId, _prefix: Option<&str>) -> Result<RawDocument> {
///         Ok(RawDocument::from_properties(vec![("port".into(), "80".into())]))
///     }
/// }
/// ```
pub trait ConfigAccessor: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Resolves the raw document for `shape`, scoped to `prefix` when given.
    fn probe_raw(&self, shape: &ShapeId, prefix: Option<&str>) -> Result<RawDocument>;
}
