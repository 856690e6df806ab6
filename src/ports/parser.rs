// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file parser trait.

use crate::domain::Result;
use std::collections::HashMap;

/// Parses file content into flat dotted keys.
///
/// Nested structures are flattened with dot notation, so
///
/// ```yaml
/// database:
///   host: localhost
/// ```
///
/// becomes `database.host -> "localhost"`. The property accessor rebuilds the
/// nesting from those keys when it assembles a raw document.
pub trait ConfigParser {
    /// Parses configuration content into a flat key-value map.
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;

    /// File extensions (without the leading dot) this parser understands.
    fn supported_extensions(&self) -> &[&str];
}
