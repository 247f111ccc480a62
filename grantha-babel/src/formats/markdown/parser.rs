//! Markdown parsing (Markdown → Grantha import)
//!
//! Pipeline: split frontmatter → serde_yaml → [`Frontmatter`]; body → Comrak AST → one pass
//! over the top-level blocks → passages and commentary attachments → merge → validate.
//!
//! The top-level walk is a small state machine. A heading closes whatever region is open
//! and may open a new one (a leaf passage, prefatory or concluding material, or a
//! commentary entry when a commentary directive is pending). Script blocks fill the open
//! region; their text is sliced from the raw source lines between the two markers, so
//! nothing inside a block is ever re-rendered by comrak.

use super::frontmatter::{parse_frontmatter, split_frontmatter, Frontmatter};
use super::{CommentaryDirective, MarkdownOptions, MARKER_NAME_PATTERN};
use crate::common::merge::merge_commentaries;
use crate::error::{GranthaError, Result};
use crate::hash::{hash_text, HASH_VERSION};
use crate::model::{CommentaryPassage, Grantha, Passage, ScriptMap, StructureLevel};
use crate::reference::{parse_ref, split_ref};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static SCRIPT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^<!--\s*({MARKER_NAME_PATTERN}):({MARKER_NAME_PATTERN})\s*-->$"
    ))
    .expect("valid regex for script open markers")
});
static SCRIPT_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^<!--\s*/({MARKER_NAME_PATTERN}):({MARKER_NAME_PATTERN})\s*-->$"
    ))
    .expect("valid regex for script close markers")
});
static COMMENTARY_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<!--\s*commentary:\s*(\{.*\})\s*-->$")
        .expect("valid regex for commentary directives")
});
static COMMENTARY_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<!--\s*/commentary\b.*-->$").expect("valid regex for commentary close")
});
static METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<!--\s*metadata:\s*(\{.*\})\s*-->$")
        .expect("valid regex for metadata comments")
});
static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<!--\s*label:\s*(\{.*\})\s*-->$").expect("valid regex for label comments")
});
static COMMENTARY_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^commentary:\s*(\S+)$").expect("valid regex for commentary headings")
});
static MATERIAL_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)^(prefatory|concluding):\s*(\S+)(?:\s+\(({MARKER_NAME_PATTERN}):\s*"(.*)"\))?$"#
    ))
    .expect("valid regex for prefatory and concluding headings")
});

/// Parse a grantha markdown document.
///
/// Fails with `InvalidRef` when a heading reference does not fit its structure level and
/// with `Validation` for malformed frontmatter, malformed directives, unterminated script
/// blocks, a mismatching `validation_hash` and integrity failures of the parsed model.
pub fn parse_from_markdown(source: &str, options: &MarkdownOptions) -> Result<Grantha> {
    let split = split_frontmatter(source)?;
    let frontmatter = parse_frontmatter(split.yaml, &options.default_script)?;
    if options.verify_validation_hash {
        verify_hash(&frontmatter, split.body)?;
    }

    let masked = mask_script_text(split.body, &options.script_tag_prefix);
    let arena = Arena::new();
    let root = parse_document(&arena, &masked, &default_comrak_options());
    let body = BodyReader::new(
        split.body,
        split.body_line,
        &frontmatter.structure_levels,
        options,
    )
    .read(root)?;

    let grantha = Grantha {
        grantha_id: frontmatter.grantha_id,
        canonical_title: frontmatter.canonical_title,
        text_type: frontmatter.text_type,
        language: frontmatter.language,
        part_num: frontmatter.part_num,
        structure_levels: frontmatter.structure_levels,
        passages: body.passages,
        prefatory_material: body.prefatory,
        concluding_material: body.concluding,
        commentaries: merge_commentaries(frontmatter.commentaries_metadata, body.attachments),
    };
    grantha.validate()?;

    debug!(
        grantha_id = %grantha.grantha_id,
        passages = grantha.passages.len(),
        commentaries = grantha.commentaries.len(),
        "parsed markdown grantha"
    );
    Ok(grantha)
}

fn default_comrak_options() -> ComrakOptions<'static> {
    // Plain CommonMark; the frontmatter is already split off.
    ComrakOptions::default()
}

/// Blanks out the lines between matching script markers, keeping the line count.
///
/// Comrak then sees each marker as a standalone HTML block, whatever the script text
/// contains. The text itself is sliced from the unmasked lines. An opening marker without
/// a matching close is left alone and reported by the reader.
fn mask_script_text(body: &str, prefix: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let mut masked = Vec::with_capacity(lines.len());
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        masked.push(line);
        index += 1;
        let Some(open) = SCRIPT_OPEN.captures(line.trim()) else {
            continue;
        };
        if &open[1] != prefix {
            continue;
        }
        let close = lines[index..].iter().position(|candidate| {
            SCRIPT_CLOSE
                .captures(candidate.trim())
                .is_some_and(|caps| caps[1] == open[1] && caps[2] == open[2])
        });
        if let Some(offset) = close {
            masked.extend(std::iter::repeat("").take(offset));
            index += offset;
        }
    }
    masked.join("\n")
}

fn verify_hash(frontmatter: &Frontmatter, body: &str) -> Result<()> {
    let Some(expected) = &frontmatter.validation_hash else {
        return Ok(());
    };
    if let Some(version) = frontmatter.hash_version {
        if version != HASH_VERSION {
            return Err(GranthaError::validation(format!(
                "unsupported hash_version {version}, expected {HASH_VERSION}"
            )));
        }
    }
    let actual = hash_text(body);
    if &actual != expected {
        return Err(GranthaError::validation(format!(
            "validation_hash mismatch: frontmatter has {expected}, body hashes to {actual}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaterialKind {
    Main,
    Prefatory,
    Concluding,
}

#[derive(Debug)]
enum Region {
    Outside,
    Passage {
        kind: MaterialKind,
        passage: Passage,
        loose: Vec<String>,
    },
    Commentary {
        commentary_id: String,
        entry: CommentaryPassage,
        loose: Vec<String>,
    },
}

#[derive(Debug)]
struct OpenScript {
    script: String,
    /// Index of the first body line after the opening marker.
    body_start: usize,
    line: usize,
}

/// Everything the body contributes to the model.
#[derive(Debug, Default)]
struct Body {
    passages: Vec<Passage>,
    prefatory: Vec<Passage>,
    concluding: Vec<Passage>,
    attachments: Vec<(String, CommentaryPassage)>,
}

struct BodyReader<'s> {
    lines: Vec<&'s str>,
    /// Source lines preceding the body, for error positions.
    line_offset: usize,
    levels: &'s [StructureLevel],
    options: &'s MarkdownOptions,
    region: Region,
    open_script: Option<OpenScript>,
    pending: Option<CommentaryDirective>,
    body: Body,
}

impl<'s> BodyReader<'s> {
    fn new(
        source: &'s str,
        line_offset: usize,
        levels: &'s [StructureLevel],
        options: &'s MarkdownOptions,
    ) -> Self {
        BodyReader {
            lines: source.lines().collect(),
            line_offset,
            levels,
            options,
            region: Region::Outside,
            open_script: None,
            pending: None,
            body: Body::default(),
        }
    }

    fn read<'a>(mut self, root: &'a AstNode<'a>) -> Result<Body> {
        for node in root.children() {
            let data = node.data.borrow();
            let start = data.sourcepos.start.line.saturating_sub(1);
            let end = data.sourcepos.end.line.saturating_sub(1).max(start);
            let line = start + 1 + self.line_offset;

            if let Some(open) = self.open_script.take() {
                let closes = match &data.value {
                    NodeValue::HtmlBlock(html) => self.closes(&open, html.literal.trim()),
                    _ => false,
                };
                if closes {
                    self.close_script(open, start);
                } else {
                    self.open_script = Some(open);
                }
                continue;
            }

            match &data.value {
                NodeValue::Heading(_) => {
                    let mut text = String::new();
                    for child in node.children() {
                        collect_text_content(child, &mut text);
                    }
                    self.on_heading(text.trim(), line)?;
                }
                NodeValue::HtmlBlock(html) => {
                    self.on_comment(&html.literal, start, line)?;
                }
                _ => {
                    let text = self.slice(start, end + 1);
                    self.on_loose(text, line);
                }
            }
        }

        if let Some(open) = self.open_script.take() {
            return Err(GranthaError::validation(format!(
                "line {}: script block '{}' is never closed",
                open.line, open.script
            )));
        }
        self.close_region();
        if let Some(directive) = self.pending.take() {
            warn!(
                commentary_id = %directive.commentary_id,
                "commentary directive at end of document has no commentary heading"
            );
        }
        Ok(self.body)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines[start..end].join("\n")
    }

    /// Lines `start..end` with the blank lines at either edge dropped. Everything else,
    /// indentation included, is kept as written.
    fn block_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        let mut block = &self.lines[start.min(end)..end];
        while let [first, rest @ ..] = block {
            if !first.trim().is_empty() {
                break;
            }
            block = rest;
        }
        while let [rest @ .., last] = block {
            if !last.trim().is_empty() {
                break;
            }
            block = rest;
        }
        block.join("\n")
    }

    fn closes(&self, open: &OpenScript, comment: &str) -> bool {
        SCRIPT_CLOSE.captures(comment).is_some_and(|caps| {
            caps[1] == self.options.script_tag_prefix && caps[2] == open.script
        })
    }

    fn on_heading(&mut self, text: &str, line: usize) -> Result<()> {
        self.close_region();
        let pending = self.pending.take();

        if let Some(caps) = COMMENTARY_HEADING.captures(text) {
            let reference = caps[1].to_string();
            let Some(directive) = pending else {
                warn!(line, reference = %reference, "commentary heading without a directive, skipping");
                return Ok(());
            };
            if let Some(expected) = &directive.passage_ref {
                if expected != &reference {
                    return Err(GranthaError::validation(format!(
                        "line {line}: commentary heading refers to '{reference}' but its directive names '{expected}'"
                    )));
                }
            }
            split_ref(&reference)?;
            self.region = Region::Commentary {
                commentary_id: directive.commentary_id,
                entry: CommentaryPassage::new(reference),
                loose: Vec::new(),
            };
            return Ok(());
        }

        if let Some(directive) = pending {
            warn!(
                line,
                commentary_id = %directive.commentary_id,
                "commentary directive not followed by a commentary heading"
            );
        }

        if let Some(caps) = MATERIAL_HEADING.captures(text) {
            let kind = if caps[1].eq_ignore_ascii_case("prefatory") {
                MaterialKind::Prefatory
            } else {
                MaterialKind::Concluding
            };
            let reference = caps[2].to_string();
            split_ref(&reference)?;
            let mut passage = Passage::new(reference);
            if let (Some(script), Some(label)) = (caps.get(3), caps.get(4)) {
                passage
                    .label
                    .insert(script.as_str().to_string(), label.as_str().to_string());
            }
            self.region = Region::Passage {
                kind,
                passage,
                loose: Vec::new(),
            };
            return Ok(());
        }

        if let Some((index, reference)) = self.structural_heading(text) {
            parse_ref(reference, index + 1).map_err(|e| match e {
                GranthaError::InvalidRef(msg) => {
                    GranthaError::InvalidRef(format!("line {line}: {msg}"))
                }
                other => other,
            })?;
            if index + 1 == self.levels.len() {
                self.region = Region::Passage {
                    kind: MaterialKind::Main,
                    passage: Passage::new(reference),
                    loose: Vec::new(),
                };
            }
            return Ok(());
        }

        debug!(line, heading = text, "heading is not part of the grantha structure");
        Ok(())
    }

    /// Level index and reference of a `<LevelKey> <ref>` heading.
    fn structural_heading<'t>(&self, text: &'t str) -> Option<(usize, &'t str)> {
        let (name, reference) = text.rsplit_once(char::is_whitespace)?;
        let name = name.trim();
        let index = self
            .levels
            .iter()
            .position(|level| level.key.eq_ignore_ascii_case(name))?;
        Some((index, reference))
    }

    fn on_comment(&mut self, literal: &str, start: usize, line: usize) -> Result<()> {
        let comment = literal.trim();

        if let Some(caps) = SCRIPT_OPEN.captures(comment) {
            if caps[1] == self.options.script_tag_prefix {
                self.open_script = Some(OpenScript {
                    script: caps[2].to_string(),
                    body_start: start + literal.lines().count(),
                    line,
                });
                return Ok(());
            }
        }

        if let Some(caps) = SCRIPT_CLOSE.captures(comment) {
            if caps[1] == self.options.script_tag_prefix {
                warn!(line, script = &caps[2], "closing script marker without an opening marker");
                return Ok(());
            }
        }

        if let Some(caps) = COMMENTARY_OPEN.captures(comment) {
            let directive: CommentaryDirective = serde_json::from_str(&caps[1]).map_err(|e| {
                GranthaError::validation(format!("line {line}: malformed commentary directive: {e}"))
            })?;
            if let Some(previous) = self.pending.replace(directive) {
                warn!(
                    line,
                    commentary_id = %previous.commentary_id,
                    "commentary directive replaced before its heading"
                );
            }
            return Ok(());
        }

        if COMMENTARY_CLOSE.is_match(comment) {
            if matches!(self.region, Region::Commentary { .. }) {
                self.close_region();
            }
            return Ok(());
        }

        if let Some(caps) = LABEL.captures(comment) {
            let label: ScriptMap = serde_json::from_str(&caps[1]).map_err(|e| {
                GranthaError::validation(format!("line {line}: malformed label comment: {e}"))
            })?;
            match &mut self.region {
                Region::Passage {
                    kind: MaterialKind::Prefatory | MaterialKind::Concluding,
                    passage,
                    ..
                } => passage.label = label,
                _ => warn!(line, "label comment outside prefatory or concluding material, ignoring"),
            }
            return Ok(());
        }

        if let Some(caps) = METADATA.captures(comment) {
            let fields: Map<String, Value> = serde_json::from_str(&caps[1]).map_err(|e| {
                GranthaError::validation(format!("line {line}: malformed metadata comment: {e}"))
            })?;
            match &mut self.region {
                Region::Passage { passage, .. } => passage.metadata.extend(fields),
                _ => warn!(line, "metadata comment outside a passage, ignoring"),
            }
            return Ok(());
        }

        debug!(line, "ignoring HTML block");
        Ok(())
    }

    fn on_loose(&mut self, text: String, line: usize) {
        match &mut self.region {
            Region::Passage { loose, .. } | Region::Commentary { loose, .. } => loose.push(text),
            Region::Outside => debug!(line, "ignoring content outside any passage"),
        }
    }

    fn close_script(&mut self, open: OpenScript, end: usize) {
        let text = self.block_text(open.body_start, end);
        let scripts = match &mut self.region {
            Region::Passage { passage, .. } => &mut passage.scripts,
            Region::Commentary { entry, .. } => &mut entry.scripts,
            Region::Outside => {
                warn!(line = open.line, script = %open.script, "script block outside any passage, ignoring");
                return;
            }
        };
        if scripts.insert(open.script.clone(), text).is_some() {
            warn!(line = open.line, script = %open.script, "script given twice, keeping the last block");
        }
    }

    fn close_region(&mut self) {
        let default_script = &self.options.default_script;
        match std::mem::replace(&mut self.region, Region::Outside) {
            Region::Outside => {}
            Region::Passage {
                kind,
                mut passage,
                loose,
            } => {
                fill_default_script(&mut passage.scripts, loose, default_script);
                match kind {
                    MaterialKind::Main => self.body.passages.push(passage),
                    MaterialKind::Prefatory => self.body.prefatory.push(passage),
                    MaterialKind::Concluding => self.body.concluding.push(passage),
                }
            }
            Region::Commentary {
                commentary_id,
                mut entry,
                loose,
            } => {
                fill_default_script(&mut entry.scripts, loose, default_script);
                self.body.attachments.push((commentary_id, entry));
            }
        }
    }
}

/// Unmarked text becomes the default script, but only when no script block was given.
fn fill_default_script(scripts: &mut ScriptMap, loose: Vec<String>, default_script: &str) {
    if !scripts.is_empty() {
        if !loose.is_empty() {
            debug!("dropping unmarked text next to script blocks");
        }
        return;
    }
    let text = loose.join("\n\n").trim().to_string();
    if !text.is_empty() {
        scripts.insert(default_script.to_string(), text);
    }
}

/// Collect text content from a heading
fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_content(child, output);
            }
        }
    }
}
