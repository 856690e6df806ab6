// SPDX-License-Identifier: MIT OR Apache-2.0

//! Untyped raw configuration tree handed from an accessor to the providers.

use crate::domain::{ConfigError, ConfigKey, ConfigValue, Result};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// A raw configuration document, deserialized into a raw shape on demand.
///
/// # Examples
///
/// ```
/// use livecfg::domain::RawDocument;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Pool {
///     size: u32,
///     name: String,
/// }
///
/// let doc = RawDocument::from_properties(vec![
///     ("size".into(), "8".into()),
///     ("name".into(), "primary".into()),
/// ]);
/// let pool: Pool = doc.deserialize().unwrap();
/// assert_eq!(pool.size, 8);
/// assert_eq!(pool.name, "primary");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RawDocument(Value);

impl RawDocument {
    /// Wraps an already-built YAML value.
    pub fn new(value: Value) -> Self {
        RawDocument(value)
    }

    /// Builds a nested document from flat dotted keys.
    ///
    /// Each value is re-typed with [`ConfigValue::to_scalar`] and handed to
    /// [`from_scalars`](Self::from_scalars).
    pub fn from_properties<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, ConfigValue)>,
    {
        Self::from_scalars(
            properties
                .into_iter()
                .map(|(key, value)| (key, value.to_scalar())),
        )
    }

    /// Builds a nested document from flat dotted keys and typed scalars.
    ///
    /// Each key is split on `.`. When a key is both a leaf and a parent
    /// (`a = 1` and `a.b = 2`), the nested table wins. A table whose keys are
    /// exactly `0..n` becomes a sequence, so `hosts.0` and `hosts.1` load into
    /// a `Vec`. An empty key sets the document root and only survives when it
    /// is the sole entry.
    pub fn from_scalars<I>(scalars: I) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, Value)>,
    {
        let mut root = Value::Mapping(Mapping::new());
        let mut root_scalar = None;

        for (key, value) in scalars {
            let segments: Vec<&str> = key.segments().collect();
            if segments.is_empty() {
                root_scalar = Some(value);
                continue;
            }
            insert_path(&mut root, &segments, value);
        }
        fold_sequences(&mut root);

        match (root_scalar, &root) {
            (Some(scalar), Value::Mapping(map)) if map.is_empty() => RawDocument(scalar),
            _ => RawDocument(root),
        }
    }

    /// Returns the underlying YAML value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns `true` if the document is an empty table.
    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Value::Mapping(map) if map.is_empty())
    }

    /// Deserializes the document into a raw shape.
    pub fn deserialize<R: DeserializeOwned>(&self) -> Result<R> {
        serde_yaml::from_value(self.0.clone()).map_err(|e| ConfigError::ParseError {
            message: format!(
                "Failed to deserialize {}: {}",
                std::any::type_name::<R>(),
                e
            ),
            source: Some(Box::new(e)),
        })
    }
}

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        RawDocument(value)
    }
}

fn insert_path(node: &mut Value, segments: &[&str], leaf: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(map) = node else {
        return;
    };

    let key = Value::String((*head).to_string());
    if rest.is_empty() {
        // A table already registered under this key keeps priority over a scalar.
        if !map.get(&key).is_some_and(Value::is_mapping) {
            map.insert(key, leaf);
        }
        return;
    }

    let child = map
        .entry(key)
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    insert_path(child, rest, leaf);
}

/// Turns every table keyed by exactly `0..n` into a sequence, innermost first.
fn fold_sequences(node: &mut Value) {
    let Value::Mapping(map) = node else {
        return;
    };
    for (_, child) in map.iter_mut() {
        fold_sequences(child);
    }

    let mut indexed: Vec<(usize, Value)> = Vec::with_capacity(map.len());
    for (key, value) in map.iter() {
        match key.as_str().and_then(sequence_index) {
            Some(index) => indexed.push((index, value.clone())),
            None => return,
        }
    }
    if indexed.is_empty() {
        return;
    }
    indexed.sort_by_key(|(index, _)| *index);
    if indexed.iter().enumerate().any(|(pos, (index, _))| pos != *index) {
        return;
    }

    *node = Value::Sequence(indexed.into_iter().map(|(_, value)| value).collect());
}

/// Plain decimal index; `"01"` or `"+1"` are ordinary keys.
fn sequence_index(key: &str) -> Option<usize> {
    let canonical = key == "0" || (!key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit()));
    if key.is_empty() || !canonical {
        return None;
    }
    key.parse().ok()
}
