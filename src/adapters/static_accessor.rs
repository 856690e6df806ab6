// SPDX-License-Identifier: MIT OR Apache-2.0

//! Accessor over an in-memory YAML document.

use crate::domain::{ConfigError, ConfigKey, RawDocument, Result, ShapeId};
use crate::ports::ConfigAccessor;
use serde_yaml::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Serves raw documents from a YAML tree held in memory.
///
/// The tree can be replaced at any time with [`StaticAccessor::set`] or
/// [`StaticAccessor::set_yaml`]; providers see the new content on their next
/// probe. A prefix selects the sub-tree under the dotted path.
///
/// # Examples
///
/// ```rust
/// use livecfg::adapters::StaticAccessor;
/// use livecfg::domain::ShapeId;
/// use livecfg::ports::ConfigAccessor;
///
/// let accessor = StaticAccessor::from_yaml("server:\n  port: 8080\n").unwrap();
/// let port: u16 = accessor
///     .probe_raw(&ShapeId::new("port"), Some("server.port"))
///     .unwrap()
///     .deserialize()
///     .unwrap();
/// assert_eq!(port, 8080);
/// ```
#[derive(Debug)]
pub struct StaticAccessor {
    document: RwLock<RawDocument>,
    probes: AtomicUsize,
}

impl StaticAccessor {
    /// Creates an accessor serving `document`.
    pub fn new(document: RawDocument) -> Self {
        Self {
            document: RwLock::new(document),
            probes: AtomicUsize::new(0),
        }
    }

    /// Parses `yaml` into the served document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self::new(parse(yaml)?))
    }

    /// Replaces the served document.
    pub fn set(&self, document: RawDocument) {
        let mut slot = match self.document.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = document;
    }

    /// Parses `yaml` and replaces the served document with it.
    ///
    /// On a parse error the current document is kept.
    pub fn set_yaml(&self, yaml: &str) -> Result<()> {
        self.set(parse(yaml)?);
        Ok(())
    }

    /// Number of probes served so far, including failed ones.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

fn parse(yaml: &str) -> Result<RawDocument> {
    serde_yaml::from_str::<Value>(yaml)
        .map(RawDocument::new)
        .map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })
}

impl ConfigAccessor for StaticAccessor {
    fn name(&self) -> &str {
        "static"
    }

    fn probe_raw(&self, shape: &ShapeId, prefix: Option<&str>) -> Result<RawDocument> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let document = match self.document.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(prefix) = prefix else {
            return Ok(document.clone());
        };

        let mut node = document.as_value();
        for segment in ConfigKey::from(prefix).segments() {
            node = node.get(segment).ok_or_else(|| ConfigError::NotFound {
                key: prefix.to_string(),
            })?;
        }
        tracing::trace!("Served '{}' from static document under '{}'", shape, prefix);
        Ok(RawDocument::new(node.clone()))
    }
}
