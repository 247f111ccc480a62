//! Writer trait definition
//!
//! This module defines the [`Writer`] trait that every output format implements, and the
//! closed [`OutputFormat`] set of formats this crate knows about. Adding a format means
//! adding a variant here, not registering an arbitrary object.

use crate::error::{GranthaError, Result};
use crate::formats::json::{JsonOptions, JsonWriter};
use crate::formats::markdown::{MarkdownOptions, MarkdownWriter};
use crate::model::{Commentary, Grantha};
use std::path::Path;

/// Selection applied before serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Scripts to include. `None` keeps every script. A requested script that is missing
    /// on any passage is an error.
    pub scripts: Option<Vec<String>>,
    /// Commentary ids to include. `None` keeps every commentary.
    pub commentaries: Option<Vec<String>>,
}

impl WriteOptions {
    /// Applies the selection to `grantha`, producing the grantha that actually gets written.
    ///
    /// Fails with `CommentaryNotFound` for unknown commentary ids, `ScriptNotAvailable` when
    /// a requested script is absent on a passage or commentary entry, and
    /// `PassageNotFound` when a commentary entry points at a missing passage.
    pub fn select(&self, grantha: &Grantha) -> Result<Grantha> {
        let mut selected = grantha.clone();

        if let Some(ids) = &self.commentaries {
            let mut kept = std::collections::BTreeMap::new();
            for id in ids {
                let commentary = grantha.commentary(id)?;
                kept.insert(id.clone(), commentary.clone());
            }
            selected.commentaries = kept;
        }

        for commentary in selected.commentaries.values() {
            for entry in &commentary.passages {
                grantha.passage(&entry.reference)?;
            }
        }

        if let Some(scripts) = &self.scripts {
            for list in [
                &mut selected.passages,
                &mut selected.prefatory_material,
                &mut selected.concluding_material,
            ] {
                for passage in list.iter_mut() {
                    *passage = passage.select_scripts(scripts)?;
                }
            }
            for commentary in selected.commentaries.values_mut() {
                select_commentary_scripts(commentary, scripts)?;
            }
        }

        Ok(selected)
    }
}

fn select_commentary_scripts(commentary: &mut Commentary, scripts: &[String]) -> Result<()> {
    let id = commentary.commentary_id.clone();
    for entry in commentary.passages.iter_mut() {
        let mut kept = std::collections::BTreeMap::new();
        for script in scripts {
            let text = entry.scripts.get(script).ok_or_else(|| {
                GranthaError::script_not_available(&format!("{id}:{}", entry.reference), script)
            })?;
            kept.insert(script.clone(), text.clone());
        }
        entry.scripts = kept;
    }
    Ok(())
}

/// Trait for grantha output formats
///
/// Implementors serialize a [`Grantha`] to text. Writing to a file is provided on top of
/// [`Writer::write`].
pub trait Writer {
    /// The name of this format (e.g., "json", "markdown")
    fn name(&self) -> &str;

    /// File extensions associated with this format, without the leading dot.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Serialize a grantha to a string.
    fn write(&self, grantha: &Grantha) -> Result<String>;

    /// Serialize a grantha to `path`, creating parent directories as needed.
    fn write_to_path(&self, grantha: &Grantha, path: &Path) -> Result<()> {
        let output = self.write(grantha)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, output)?;
        tracing::info!(path = %path.display(), format = self.name(), "wrote grantha");
        Ok(())
    }
}

/// The closed set of supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Markdown];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        }
    }

    pub fn file_extensions(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Json => &["json"],
            OutputFormat::Markdown => &["md", "markdown"],
        }
    }

    /// Get a format by name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.name() == name)
            .ok_or_else(|| GranthaError::Serialization(format!("Format '{name}' not found")))
    }

    /// Detect format from filename based on file extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;
        Self::ALL
            .into_iter()
            .find(|format| format.file_extensions().contains(&extension))
    }

    /// Build the writer for this format with default format options.
    pub fn writer(self, options: WriteOptions) -> Box<dyn Writer> {
        match self {
            OutputFormat::Json => Box::new(JsonWriter::new(JsonOptions::default(), options)),
            OutputFormat::Markdown => Box::new(MarkdownWriter::new(
                MarkdownOptions::default(),
                options,
            )),
        }
    }
}
