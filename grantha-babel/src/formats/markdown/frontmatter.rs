//! YAML frontmatter of grantha markdown
//!
//! The frontmatter carries the grantha-level metadata: id, titles, the structure levels
//! and the display metadata of commentaries. Two historical shapes are accepted on read:
//!
//! - `structure_levels` as a flat list, or as a single chain nested through `children`
//! - `commentaries_metadata` as a map keyed by id, or as a list of entries with
//!   `commentary_id`
//!
//! Titles and commentator names may be a plain string (taken as the default script) or a
//! map keyed by script. The writer always emits the flat list and map shapes.

use crate::error::{GranthaError, Result};
use crate::model::{CommentaryMetadata, Grantha, ScriptMap, StructureLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A frontmatter block split off a markdown source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub yaml: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
    /// Number of source lines before `body`.
    pub body_line: usize,
}

/// Splits `source` into its frontmatter and body.
///
/// The first line must be `---` (a leading BOM is ignored); the block ends at the next
/// `---` or `...` line.
pub fn split_frontmatter(source: &str) -> Result<SplitDocument<'_>> {
    let source = source.trim_start_matches('\u{feff}');
    let mut lines = source.split_inclusive('\n');
    let first = lines
        .next()
        .ok_or_else(|| GranthaError::validation("document is empty"))?;
    if first.trim_end() != "---" {
        return Err(GranthaError::validation(
            "document must start with a `---` frontmatter block",
        ));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut line_count = 1;
    for line in lines {
        line_count += 1;
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Ok(SplitDocument {
                yaml: &source[yaml_start..offset],
                body: &source[offset + line.len()..],
                body_line: line_count,
            });
        }
        offset += line.len();
    }
    Err(GranthaError::validation("frontmatter block is never closed"))
}

/// Grantha metadata carried in the frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub grantha_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub canonical_title: ScriptMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_num: Option<u32>,
    pub structure_levels: Vec<StructureLevel>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub commentaries_metadata: BTreeMap<String, CommentaryMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_hash: Option<String>,
}

impl Frontmatter {
    /// The frontmatter describing `grantha`, without a validation hash.
    pub fn from_grantha(grantha: &Grantha) -> Self {
        Frontmatter {
            grantha_id: grantha.grantha_id.clone(),
            canonical_title: grantha.canonical_title.clone(),
            text_type: grantha.text_type.clone(),
            language: grantha.language.clone(),
            part_num: grantha.part_num,
            structure_levels: grantha.structure_levels.clone(),
            commentaries_metadata: grantha
                .commentaries
                .iter()
                .map(|(id, commentary)| (id.clone(), commentary.metadata()))
                .collect(),
            hash_version: None,
            validation_hash: None,
        }
    }

    /// YAML text of the block, without the `---` delimiters.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            GranthaError::Serialization(format!("frontmatter serialization failed: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptText {
    Plain(String),
    ByScript(ScriptMap),
}

impl ScriptText {
    fn into_map(self, default_script: &str) -> ScriptMap {
        match self {
            ScriptText::Plain(text) => BTreeMap::from([(default_script.to_string(), text)]),
            ScriptText::ByScript(map) => map,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    key: String,
    #[serde(rename = "scriptNames", default)]
    script_names: ScriptMap,
    #[serde(default)]
    children: Option<RawChildren>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChildren {
    Many(Vec<RawLevel>),
    One(Box<RawLevel>),
}

#[derive(Debug, Deserialize)]
struct RawCommentaryMetadata {
    #[serde(default)]
    commentary_title: Option<String>,
    #[serde(default)]
    commentator: Option<ScriptText>,
}

#[derive(Debug, Deserialize)]
struct RawListedCommentary {
    commentary_id: String,
    #[serde(default)]
    commentary_title: Option<String>,
    #[serde(default)]
    commentator: Option<ScriptText>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommentaries {
    ById(BTreeMap<String, RawCommentaryMetadata>),
    Listed(Vec<RawListedCommentary>),
}

#[derive(Debug, Deserialize)]
struct RawFrontmatter {
    #[serde(default)]
    grantha_id: Option<String>,
    #[serde(default)]
    canonical_title: Option<ScriptText>,
    #[serde(default)]
    text_type: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    part_num: Option<u32>,
    #[serde(default)]
    structure_levels: Vec<RawLevel>,
    #[serde(default)]
    commentaries_metadata: Option<RawCommentaries>,
    #[serde(default)]
    validation_hash: Option<String>,
    #[serde(default)]
    hash_version: Option<u32>,
}

/// Reads the frontmatter YAML.
///
/// Fails with `Validation` when the YAML is malformed, `grantha_id` is missing or empty,
/// no structure level is declared, or a level key is declared twice.
pub fn parse_frontmatter(yaml: &str, default_script: &str) -> Result<Frontmatter> {
    let raw: RawFrontmatter = serde_yaml::from_str(yaml)
        .map_err(|e| GranthaError::validation(format!("malformed frontmatter: {e}")))?;

    let grantha_id = raw
        .grantha_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| GranthaError::validation("frontmatter is missing grantha_id"))?;

    let mut structure_levels = Vec::new();
    flatten_levels(raw.structure_levels, &mut structure_levels);
    if structure_levels.is_empty() {
        return Err(GranthaError::validation(
            "frontmatter declares no structure_levels",
        ));
    }
    let mut keys = HashSet::new();
    for level in &structure_levels {
        if !keys.insert(level.key.to_lowercase()) {
            return Err(GranthaError::validation(format!(
                "structure level '{}' is declared twice",
                level.key
            )));
        }
    }

    let commentaries_metadata = match raw.commentaries_metadata {
        None => BTreeMap::new(),
        Some(RawCommentaries::ById(map)) => map
            .into_iter()
            .map(|(id, meta)| {
                let metadata = CommentaryMetadata {
                    commentary_title: meta.commentary_title,
                    commentator: script_map(meta.commentator, default_script),
                };
                (id, metadata)
            })
            .collect(),
        Some(RawCommentaries::Listed(list)) => list
            .into_iter()
            .map(|entry| {
                let metadata = CommentaryMetadata {
                    commentary_title: entry.commentary_title,
                    commentator: script_map(entry.commentator, default_script),
                };
                (entry.commentary_id, metadata)
            })
            .collect(),
    };

    Ok(Frontmatter {
        grantha_id,
        canonical_title: script_map(raw.canonical_title, default_script),
        text_type: raw.text_type,
        language: raw.language,
        part_num: raw.part_num,
        structure_levels,
        commentaries_metadata,
        hash_version: raw.hash_version,
        validation_hash: raw.validation_hash,
    })
}

fn script_map(text: Option<ScriptText>, default_script: &str) -> ScriptMap {
    text.map(|t| t.into_map(default_script)).unwrap_or_default()
}

/// Depth-first: a level comes before its children. A nested chain is followed through its
/// first child only, since every passage has the same depth.
fn flatten_levels(levels: Vec<RawLevel>, out: &mut Vec<StructureLevel>) {
    for level in levels {
        out.push(StructureLevel {
            key: level.key,
            script_names: level.script_names,
        });
        let first_child = match level.children {
            Some(RawChildren::Many(children)) => {
                if children.len() > 1 {
                    debug!(
                        parent = %out[out.len() - 1].key,
                        "structure level has sibling children, following the first"
                    );
                }
                children.into_iter().next()
            }
            Some(RawChildren::One(child)) => Some(*child),
            None => None,
        };
        if let Some(child) = first_child {
            flatten_levels(vec![child], out);
        }
    }
}
