//! JSON format implementation
//!
//! The JSON document is the model itself, serialized through serde:
//!
//! ```text
//! {
//!   "grantha_id": "...",
//!   "structure_levels": [{"key": "Chapter"}, {"key": "Mantra"}],
//!   "passages": [{"ref": "1.1", "scripts": {"devanagari": "..."}}],
//!   "commentaries": {
//!     "<commentary_id>": {
//!       "commentary_title": "...",
//!       "commentator": {"devanagari": "..."},
//!       "passages": [{"ref": "1.1", "scripts": {...}}]
//!     }
//!   }
//! }
//! ```
//!
//! No hierarchy reconstruction is needed: the flat passage order is the document order.
//! Reading JSON back fills each commentary's id from its map key and runs the model's
//! integrity checks.

use crate::error::{GranthaError, Result};
use crate::format::{WriteOptions, Writer};
use crate::model::Grantha;

/// Output knobs for [`JsonWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    /// Indent output (two spaces) instead of emitting a single line.
    pub pretty: bool,
    /// Append a trailing newline.
    pub trailing_newline: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            pretty: true,
            trailing_newline: true,
        }
    }
}

/// Writes a grantha as JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    options: JsonOptions,
    selection: WriteOptions,
}

impl JsonWriter {
    pub fn new(options: JsonOptions, selection: WriteOptions) -> Self {
        JsonWriter { options, selection }
    }
}

impl Writer for JsonWriter {
    fn name(&self) -> &str {
        "json"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn write(&self, grantha: &Grantha) -> Result<String> {
        let selected = self.selection.select(grantha)?;
        let mut output = if self.options.pretty {
            serde_json::to_string_pretty(&selected)
        } else {
            serde_json::to_string(&selected)
        }
        .map_err(|e| GranthaError::Serialization(format!("JSON serialization failed: {e}")))?;
        if self.options.trailing_newline {
            output.push('\n');
        }
        Ok(output)
    }
}

/// Reads a grantha from its JSON form.
pub fn parse_from_json(source: &str) -> Result<Grantha> {
    let mut grantha: Grantha = serde_json::from_str(source)
        .map_err(|e| GranthaError::validation(format!("malformed grantha JSON: {e}")))?;
    for (id, commentary) in grantha.commentaries.iter_mut() {
        commentary.commentary_id = id.clone();
    }
    grantha.validate()?;
    Ok(grantha)
}
