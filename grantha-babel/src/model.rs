//! Canonical document model.
//!
//! Every format converts to and from these types. Serde derives give the JSON schema
//! directly; markdown goes through the parser and serializer in `formats::markdown`.

use crate::error::{GranthaError, Result};
use crate::reference::parse_ref;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Text keyed by script identifier (`devanagari`, `roman`, ...).
pub type ScriptMap = BTreeMap<String, String>;

/// One named depth of the grantha's hierarchy (e.g. Chapter, Mantra).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureLevel {
    pub key: String,
    #[serde(
        rename = "scriptNames",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub script_names: ScriptMap,
}

impl StructureLevel {
    pub fn new(key: impl Into<String>) -> Self {
        StructureLevel {
            key: key.into(),
            script_names: BTreeMap::new(),
        }
    }
}

/// The smallest addressable unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub scripts: ScriptMap,
    /// Heading label, only used by prefatory and concluding material.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub label: ScriptMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Passage {
    pub fn new(reference: impl Into<String>) -> Self {
        Passage {
            reference: reference.into(),
            scripts: BTreeMap::new(),
            label: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_script(mut self, script: impl Into<String>, text: impl Into<String>) -> Self {
        self.scripts.insert(script.into(), text.into());
        self
    }

    /// Text of this passage in `script`.
    pub fn text(&self, script: &str) -> Result<&str> {
        self.scripts
            .get(script)
            .map(String::as_str)
            .ok_or_else(|| GranthaError::script_not_available(&self.reference, script))
    }

    /// A copy restricted to `scripts`; every requested script must be present.
    pub fn select_scripts(&self, scripts: &[String]) -> Result<Passage> {
        let mut selected = BTreeMap::new();
        for script in scripts {
            selected.insert(script.clone(), self.text(script)?.to_string());
        }
        Ok(Passage {
            scripts: selected,
            ..self.clone()
        })
    }
}

/// Commentary text attached to one passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryPassage {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub scripts: ScriptMap,
}

impl CommentaryPassage {
    pub fn new(reference: impl Into<String>) -> Self {
        CommentaryPassage {
            reference: reference.into(),
            scripts: BTreeMap::new(),
        }
    }

    pub fn with_script(mut self, script: impl Into<String>, text: impl Into<String>) -> Self {
        self.scripts.insert(script.into(), text.into());
        self
    }
}

/// Display metadata of a commentary, as declared in frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary_title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commentator: ScriptMap,
}

/// A secondary text layered over passages of the grantha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    /// Filled from the enclosing map key.
    #[serde(skip)]
    pub commentary_id: String,
    #[serde(default)]
    pub commentary_title: Option<String>,
    #[serde(default)]
    pub commentator: ScriptMap,
    #[serde(default)]
    pub passages: Vec<CommentaryPassage>,
}

impl Commentary {
    pub fn new(commentary_id: impl Into<String>) -> Self {
        Commentary {
            commentary_id: commentary_id.into(),
            commentary_title: None,
            commentator: BTreeMap::new(),
            passages: Vec::new(),
        }
    }

    pub fn metadata(&self) -> CommentaryMetadata {
        CommentaryMetadata {
            commentary_title: self.commentary_title.clone(),
            commentator: self.commentator.clone(),
        }
    }

    /// The entry attached to `reference`, if any.
    pub fn passage(&self, reference: &str) -> Option<&CommentaryPassage> {
        self.passages.iter().find(|p| p.reference == reference)
    }
}

/// A complete structured work: ordered passages plus commentaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grantha {
    pub grantha_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub canonical_title: ScriptMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_num: Option<u32>,
    pub structure_levels: Vec<StructureLevel>,
    #[serde(default)]
    pub passages: Vec<Passage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefatory_material: Vec<Passage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concluding_material: Vec<Passage>,
    #[serde(default)]
    pub commentaries: BTreeMap<String, Commentary>,
}

impl Grantha {
    pub fn new(grantha_id: impl Into<String>, structure_levels: Vec<StructureLevel>) -> Self {
        Grantha {
            grantha_id: grantha_id.into(),
            canonical_title: BTreeMap::new(),
            text_type: None,
            language: None,
            part_num: None,
            structure_levels,
            passages: Vec::new(),
            prefatory_material: Vec::new(),
            concluding_material: Vec::new(),
            commentaries: BTreeMap::new(),
        }
    }

    /// Number of segments every passage reference must have.
    pub fn depth(&self) -> usize {
        self.structure_levels.len()
    }

    pub fn leaf_level(&self) -> Option<&StructureLevel> {
        self.structure_levels.last()
    }

    pub fn passage(&self, reference: &str) -> Result<&Passage> {
        self.passages
            .iter()
            .find(|p| p.reference == reference)
            .ok_or_else(|| GranthaError::PassageNotFound(reference.to_string()))
    }

    /// Passage text in one script.
    pub fn passage_text(&self, reference: &str, script: &str) -> Result<&str> {
        self.passage(reference)?.text(script)
    }

    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.passages.iter().map(|p| p.reference.as_str())
    }

    pub fn commentary(&self, commentary_id: &str) -> Result<&Commentary> {
        self.commentaries
            .get(commentary_id)
            .ok_or_else(|| GranthaError::CommentaryNotFound(commentary_id.to_string()))
    }

    /// The entry of `commentary_id` attached to `reference`.
    pub fn commentary_passage(
        &self,
        commentary_id: &str,
        reference: &str,
    ) -> Result<&CommentaryPassage> {
        self.commentary(commentary_id)?
            .passage(reference)
            .ok_or_else(|| {
                GranthaError::CommentaryNotFound(format!("{commentary_id} for '{reference}'"))
            })
    }

    pub fn commentary_ids(&self) -> Vec<&str> {
        self.commentaries.keys().map(String::as_str).collect()
    }

    /// All commentary entries attached to `reference`, in commentary id order.
    pub fn commentaries_for(&self, reference: &str) -> Vec<(&Commentary, &CommentaryPassage)> {
        self.commentaries
            .values()
            .flat_map(|c| {
                c.passages
                    .iter()
                    .filter(move |p| p.reference == reference)
                    .map(move |p| (c, p))
            })
            .collect()
    }

    /// Scripts present on any passage, sorted.
    pub fn available_scripts(&self) -> Vec<String> {
        let mut scripts: Vec<String> = self
            .passages
            .iter()
            .flat_map(|p| p.scripts.keys().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        scripts.sort();
        scripts
    }

    /// Checks the structural invariants of the model.
    ///
    /// Fails with `InvalidRef` when a passage reference does not match the structure depth
    /// and with `Validation` on duplicate references, an empty structure or commentary
    /// entries pointing at passages that do not exist.
    pub fn validate(&self) -> Result<()> {
        if self.structure_levels.is_empty() {
            return Err(GranthaError::validation("structure_levels cannot be empty"));
        }
        let depth = self.depth();
        let mut seen = HashSet::new();
        for passage in &self.passages {
            parse_ref(&passage.reference, depth)?;
            if !seen.insert(passage.reference.as_str()) {
                return Err(GranthaError::validation(format!(
                    "duplicate passage ref '{}'",
                    passage.reference
                )));
            }
        }
        for (id, commentary) in &self.commentaries {
            if id != &commentary.commentary_id {
                return Err(GranthaError::validation(format!(
                    "commentary keyed '{id}' carries id '{}'",
                    commentary.commentary_id
                )));
            }
            for entry in &commentary.passages {
                if !seen.contains(entry.reference.as_str()) {
                    return Err(GranthaError::validation(format!(
                        "commentary '{id}' references missing passage '{}'",
                        entry.reference
                    )));
                }
            }
        }
        Ok(())
    }
}
