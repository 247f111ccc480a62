//! Fluent construction of a [`Grantha`]
//!
//! ```text
//! let grantha = GranthaBuilder::new("isha", &["Mantra"])
//!     .title("devanagari", "ईशोपनिषत्")
//!     .passage("1", &[("devanagari", "ईशा वास्यमिदं सर्वम्")])
//!     .commentary("bhashya", Some("Bhashya"), &[("devanagari", "शङ्कर")])
//!     .commentary_passage("bhashya", "1", &[("devanagari", "ईशा ईशिता")])
//!     .build()?;
//! ```
//!
//! `build` runs [`Grantha::validate`], so a builder never hands out a grantha with
//! dangling commentary references or malformed passage refs.

use crate::error::Result;
use crate::model::{Commentary, CommentaryPassage, Grantha, Passage, ScriptMap, StructureLevel};
use serde_json::Value;

fn script_map(scripts: &[(&str, &str)]) -> ScriptMap {
    scripts
        .iter()
        .map(|(script, text)| (script.to_string(), text.to_string()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct GranthaBuilder {
    grantha: Grantha,
}

impl GranthaBuilder {
    pub fn new(grantha_id: impl Into<String>, levels: &[&str]) -> Self {
        let structure_levels = levels.iter().map(|key| StructureLevel::new(*key)).collect();
        GranthaBuilder {
            grantha: Grantha::new(grantha_id, structure_levels),
        }
    }

    pub fn title(mut self, script: &str, title: &str) -> Self {
        self.grantha
            .canonical_title
            .insert(script.to_string(), title.to_string());
        self
    }

    pub fn text_type(mut self, text_type: impl Into<String>) -> Self {
        self.grantha.text_type = Some(text_type.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.grantha.language = Some(language.into());
        self
    }

    pub fn part_num(mut self, part_num: u32) -> Self {
        self.grantha.part_num = Some(part_num);
        self
    }

    /// Appends a passage; passages keep insertion order.
    pub fn passage(mut self, reference: &str, scripts: &[(&str, &str)]) -> Self {
        let mut passage = Passage::new(reference);
        passage.scripts = script_map(scripts);
        self.grantha.passages.push(passage);
        self
    }

    /// Sets a metadata field on the most recently added passage.
    pub fn passage_metadata(mut self, key: &str, value: Value) -> Self {
        if let Some(passage) = self.grantha.passages.last_mut() {
            passage.metadata.insert(key.to_string(), value);
        }
        self
    }

    pub fn prefatory(
        mut self,
        reference: &str,
        label: &[(&str, &str)],
        scripts: &[(&str, &str)],
    ) -> Self {
        let mut passage = Passage::new(reference);
        passage.label = script_map(label);
        passage.scripts = script_map(scripts);
        self.grantha.prefatory_material.push(passage);
        self
    }

    pub fn concluding(
        mut self,
        reference: &str,
        label: &[(&str, &str)],
        scripts: &[(&str, &str)],
    ) -> Self {
        let mut passage = Passage::new(reference);
        passage.label = script_map(label);
        passage.scripts = script_map(scripts);
        self.grantha.concluding_material.push(passage);
        self
    }

    /// Declares a commentary's display metadata, creating the commentary if needed.
    pub fn commentary(
        mut self,
        commentary_id: &str,
        title: Option<&str>,
        commentator: &[(&str, &str)],
    ) -> Self {
        let commentary = self
            .grantha
            .commentaries
            .entry(commentary_id.to_string())
            .or_insert_with(|| Commentary::new(commentary_id));
        commentary.commentary_title = title.map(str::to_string);
        commentary.commentator = script_map(commentator);
        self
    }

    /// Attaches commentary text to a passage, creating the commentary if needed.
    pub fn commentary_passage(
        mut self,
        commentary_id: &str,
        reference: &str,
        scripts: &[(&str, &str)],
    ) -> Self {
        let mut entry = CommentaryPassage::new(reference);
        entry.scripts = script_map(scripts);
        self.grantha
            .commentaries
            .entry(commentary_id.to_string())
            .or_insert_with(|| Commentary::new(commentary_id))
            .passages
            .push(entry);
        self
    }

    pub fn build(self) -> Result<Grantha> {
        self.grantha.validate()?;
        Ok(self.grantha)
    }
}
