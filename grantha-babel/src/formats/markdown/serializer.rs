//! Markdown serialization (Grantha → Markdown export)
//!
//! Pipeline: flat passage list → hierarchy tree → headings and comment-delimited blocks.
//!
//! The body is produced first because the frontmatter carries a hash of it. Blocks are
//! separated by one blank line, so every marker comment stands alone as an HTML block when
//! the document is read back.

use super::frontmatter::Frontmatter;
use super::{is_marker_name, CommentaryDirective, MarkdownOptions};
use crate::common::hierarchy::{build_hierarchy_tree, sort_tree_keys, TreeNode};
use crate::error::{GranthaError, Result};
use crate::hash::{hash_text, HASH_VERSION};
use crate::model::{Grantha, Passage, ScriptMap};
use crate::reference::parse_ref;
use serde::Serialize;

/// Serialize a grantha to markdown.
///
/// Fails with `InvalidRef` when a passage reference does not match the structure depth,
/// with `PassageNotFound` when a commentary entry points at a passage that does not exist
/// and with `Validation` when the marker prefix or a script id cannot be read back.
pub fn serialize_to_markdown(grantha: &Grantha, options: &MarkdownOptions) -> Result<String> {
    check_writable(grantha, options)?;

    let mut blocks = BlockWriter {
        grantha,
        options,
        blocks: Vec::new(),
    };
    for passage in &grantha.prefatory_material {
        blocks.material("Prefatory", passage)?;
    }
    let tree = build_hierarchy_tree(&grantha.passages);
    blocks.tree(&tree, 0, "")?;
    for passage in &grantha.concluding_material {
        blocks.material("Concluding", passage)?;
    }

    let mut body = String::from("\n");
    body.push_str(&blocks.blocks.join("\n\n"));
    body.push('\n');

    let mut frontmatter = Frontmatter::from_grantha(grantha);
    if options.include_validation_hash {
        frontmatter.hash_version = Some(HASH_VERSION);
        frontmatter.validation_hash = Some(hash_text(&body));
    }
    Ok(format!("---\n{}---\n{body}", frontmatter.to_yaml()?))
}

fn check_writable(grantha: &Grantha, options: &MarkdownOptions) -> Result<()> {
    if !is_marker_name(&options.script_tag_prefix) {
        return Err(GranthaError::validation(format!(
            "script tag prefix '{}' cannot be written as a marker",
            options.script_tag_prefix
        )));
    }
    let passages = grantha
        .prefatory_material
        .iter()
        .chain(&grantha.passages)
        .chain(&grantha.concluding_material);
    let entries = grantha.commentaries.values().flat_map(|c| &c.passages);
    let script_ids = passages
        .flat_map(|p| p.scripts.keys().chain(p.label.keys()))
        .chain(entries.flat_map(|e| e.scripts.keys()));
    for script in script_ids {
        if !is_marker_name(script) {
            return Err(GranthaError::validation(format!(
                "script id '{script}' cannot be written as a marker"
            )));
        }
    }

    let depth = grantha.depth();
    if depth == 0 {
        return Err(GranthaError::validation("structure_levels cannot be empty"));
    }
    for passage in &grantha.passages {
        parse_ref(&passage.reference, depth)?;
    }
    for commentary in grantha.commentaries.values() {
        for entry in &commentary.passages {
            grantha.passage(&entry.reference)?;
        }
    }
    Ok(())
}

fn heading(level: usize, text: &str) -> String {
    format!("{} {text}", "#".repeat(level.clamp(1, 6)))
}

/// JSON for a comment payload. `-->` may only occur inside JSON strings, where `>` can be
/// written as an escape.
fn comment_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| GranthaError::Serialization(format!("comment payload: {e}")))?;
    Ok(json.replace("-->", "--\\u003e"))
}

struct BlockWriter<'g> {
    grantha: &'g Grantha,
    options: &'g MarkdownOptions,
    blocks: Vec<String>,
}

impl BlockWriter<'_> {
    fn tree(&mut self, node: &TreeNode<'_>, depth: usize, prefix: &str) -> Result<()> {
        let grantha = self.grantha;
        let level_key = grantha
            .structure_levels
            .get(depth)
            .map(|level| level.key.as_str())
            .unwrap_or_default();
        for key in sort_tree_keys(node) {
            let Some(child) = node.child(key) else {
                continue;
            };
            let reference = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            };
            self.blocks
                .push(heading(depth + 1, &format!("{level_key} {reference}")));
            for passage in &child.passages {
                self.passage_body(passage)?;
                self.commentaries(&passage.reference)?;
            }
            self.tree(child, depth + 1, &reference)?;
        }
        Ok(())
    }

    /// The heading shows one label for readers; the label comment carries all of them.
    fn material(&mut self, kind: &str, passage: &Passage) -> Result<()> {
        let label = self
            .options
            .ordered_scripts(passage.label.keys())
            .first()
            .map(|script| (script, &passage.label[*script]))
            .filter(|(_, text)| !text.contains(['\n', '\r']))
            .map(|(script, text)| format!(" ({script}: \"{text}\")"))
            .unwrap_or_default();
        self.blocks
            .push(heading(1, &format!("{kind}: {}{label}", passage.reference)));
        if !passage.label.is_empty() {
            self.blocks
                .push(format!("<!-- label: {} -->", comment_json(&passage.label)?));
        }
        self.passage_body(passage)
    }

    fn passage_body(&mut self, passage: &Passage) -> Result<()> {
        if !passage.metadata.is_empty() {
            self.blocks
                .push(format!("<!-- metadata: {} -->", comment_json(&passage.metadata)?));
        }
        self.scripts(&passage.scripts);
        Ok(())
    }

    fn scripts(&mut self, scripts: &ScriptMap) {
        let options = self.options;
        let prefix = &options.script_tag_prefix;
        for script in options.ordered_scripts(scripts.keys()) {
            self.blocks.push(format!(
                "<!-- {prefix}:{script} -->\n\n{}\n\n<!-- /{prefix}:{script} -->",
                scripts[script]
            ));
        }
    }

    fn commentaries(&mut self, reference: &str) -> Result<()> {
        let grantha = self.grantha;
        let commentary_level = grantha.depth() + 1;
        for (commentary, entry) in grantha.commentaries_for(reference) {
            let open = CommentaryDirective {
                commentary_id: commentary.commentary_id.clone(),
                passage_ref: Some(reference.to_string()),
            };
            let close = CommentaryDirective {
                commentary_id: commentary.commentary_id.clone(),
                passage_ref: None,
            };
            self.blocks
                .push(format!("<!-- commentary: {} -->", comment_json(&open)?));
            self.blocks
                .push(heading(commentary_level, &format!("Commentary: {reference}")));
            self.scripts(&entry.scripts);
            self.blocks
                .push(format!("<!-- /commentary: {} -->", comment_json(&close)?));
        }
        Ok(())
    }
}
