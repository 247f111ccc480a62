//! Markdown format implementation
//!
//! This module implements bidirectional conversion between grantha markdown sources and the
//! canonical model.
//!
//! # Library Choice
//!
//! We use the `comrak` crate to find the block structure of the body (headings, HTML
//! comment blocks, paragraphs). Script text is then sliced from the raw source lines by
//! source position, never re-rendered, so verse line breaks and punctuation survive exactly.
//! Frontmatter is YAML, read and written with `serde_yaml`.
//!
//! # Element Mapping Table
//!
//! | Model element          | Markdown                                                    |
//! |------------------------|-------------------------------------------------------------|
//! | Grantha metadata       | `---` YAML frontmatter                                      |
//! | Structural segment     | `#… <LevelKey> <ref>` (one `#` per depth)                   |
//! | Passage                | heading of the leaf level                                   |
//! | Passage script text    | `<!-- sanskrit:<script> -->` … `<!-- /sanskrit:<script> -->` |
//! | Passage metadata       | `<!-- metadata: {json} -->`                                 |
//! | Material label         | `<!-- label: {json} -->` after a prefatory/concluding heading |
//! | Commentary attachment  | `<!-- commentary: {"commentary_id", "passage_ref"} -->`     |
//! |                        | followed by `#… Commentary: <ref>` and script blocks        |
//! | Prefatory / concluding | `# Prefatory: <ref> (<script>: "<label>")`                  |
//!
//! The `sanskrit` marker prefix and the fallback script are configurable through
//! [`MarkdownOptions`]. Marker prefixes and script ids may contain anything but whitespace
//! and `:<>"()`, and may not start with `/`; the writer rejects any other name.
//!
//! Script text is kept line for line. Only the blank lines next to the markers are dropped,
//! and the lines between two markers are hidden from comrak before it runs, so no markdown
//! construct inside a script can swallow the closing marker.
//!
//! # Architecture Notes
//!
//! The body is flat; the model's passage list is flat too, so parsing needs no tree. The
//! serializer is where nesting matters: it rebuilds the hierarchy with
//! `common::hierarchy` and emits one heading per structural segment, in numeric-aware
//! order. Parsing what the serializer wrote yields the same passages and commentaries.

pub mod frontmatter;
pub mod parser;
pub mod serializer;

use crate::error::Result;
use crate::format::{WriteOptions, Writer};
use crate::model::Grantha;
use serde::{Deserialize, Serialize};

/// JSON payload of `<!-- commentary: … -->` and `<!-- /commentary: … -->` comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CommentaryDirective {
    pub commentary_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_ref: Option<String>,
}

/// Characters that may not appear in a marker prefix or script id.
const MARKER_NAME_FORBIDDEN: &[char] = &[':', '<', '>', '"', '(', ')'];

/// Regex fragment matching the names accepted by [`is_marker_name`].
pub(crate) const MARKER_NAME_PATTERN: &str = r#"[^\s:<>"()/][^\s:<>"()]*"#;

/// Whether `name` can be written as a marker prefix or script id and read back.
pub(crate) fn is_marker_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name
            .chars()
            .any(|c| c.is_whitespace() || MARKER_NAME_FORBIDDEN.contains(&c))
}

/// Knobs shared by the markdown parser and serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Prefix of script block markers: `<!-- {prefix}:{script} -->`.
    pub script_tag_prefix: String,
    /// Script assigned to passage text that is not inside any script block.
    pub default_script: String,
    /// Order in which scripts are written; unlisted scripts follow alphabetically.
    pub script_order: Vec<String>,
    /// Write `validation_hash` and `hash_version` into the frontmatter.
    pub include_validation_hash: bool,
    /// Check `validation_hash` when parsing, if the document carries one.
    pub verify_validation_hash: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        MarkdownOptions {
            script_tag_prefix: "sanskrit".to_string(),
            default_script: "devanagari".to_string(),
            script_order: vec![
                "devanagari".to_string(),
                "roman".to_string(),
                "kannada".to_string(),
            ],
            include_validation_hash: true,
            verify_validation_hash: true,
        }
    }
}

impl MarkdownOptions {
    /// Scripts of `available` in writing order.
    pub(crate) fn ordered_scripts<'a>(&self, available: impl Iterator<Item = &'a String>) -> Vec<&'a String> {
        let mut scripts: Vec<&String> = available.collect();
        scripts.sort_by_key(|script| {
            let rank = self
                .script_order
                .iter()
                .position(|s| s == *script)
                .unwrap_or(self.script_order.len());
            (rank, (*script).clone())
        });
        scripts
    }
}

/// Writes a grantha as structured markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownWriter {
    options: MarkdownOptions,
    selection: WriteOptions,
}

impl MarkdownWriter {
    pub fn new(options: MarkdownOptions, selection: WriteOptions) -> Self {
        MarkdownWriter { options, selection }
    }

    /// Parse a markdown source with this writer's options.
    pub fn parse(&self, source: &str) -> Result<Grantha> {
        parser::parse_from_markdown(source, &self.options)
    }
}

impl Writer for MarkdownWriter {
    fn name(&self) -> &str {
        "markdown"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn write(&self, grantha: &Grantha) -> Result<String> {
        let selected = self.selection.select(grantha)?;
        serializer::serialize_to_markdown(&selected, &self.options)
    }
}
