//! Chunk fidelity validator
//!
//! Large texts are converted chunk by chunk (transliteration, cleanup passes, format
//! changes). After each step the validator compares the Devanagari content of the original
//! chunk with the converted one. A mismatch is a normal outcome reported in the
//! [`ChunkReport`], never an error; the caller decides what to do with it.
//!
//! Counting rule, applied identically to both sides:
//!
//! 1. drop frontmatter, HTML comments, heading lines and `**` markers
//! 2. rewrite `॥` as `।।`
//! 3. extract the Devanagari words and count their characters
//!
//! On a mismatch, the extractions (and, unless `no_diff` is set, a word diff) are written
//! under `<file_log_dir>/chunks/chunk_<index>/`.

pub mod diff;

use crate::common::devanagari::{
    clean_for_comparison, count_devanagari, extract_devanagari_words, normalize_dandas,
};
use crate::error::Result;
use diff::{diff_words, render_diff};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Unchanged words shown around each change in the diff file.
const DIFF_CONTEXT: usize = 3;

/// Validator knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOptions {
    /// Require exact equality and skip writing the diff file.
    pub no_diff: bool,
    /// Allowed `char_diff` for a pass. Zero demands identical word sequences.
    pub tolerance: usize,
}

impl ValidatorOptions {
    pub fn effective_tolerance(&self) -> usize {
        if self.no_diff {
            0
        } else {
            self.tolerance
        }
    }
}

/// Identifies the chunk being validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_index: usize,
    #[serde(default)]
    pub description: String,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, description: impl Into<String>) -> Self {
        ChunkMetadata {
            chunk_index,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChunkStatus {
    Passed,
    Mismatch,
}

/// Verdict for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkReport {
    pub status: ChunkStatus,
    pub char_diff: usize,
    pub input_chars: usize,
    pub output_chars: usize,
    pub chunk_index: usize,
    pub description: String,
}

impl ChunkReport {
    pub fn passed(&self) -> bool {
        self.status == ChunkStatus::Passed
    }
}

/// Aggregate over a run of chunk reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_chunks: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub total_input_chars: usize,
    pub total_output_chars: usize,
    pub total_char_diff: usize,
    pub mismatched_chunks: Vec<usize>,
}

impl ValidationSummary {
    pub fn all_passed(&self) -> bool {
        self.mismatched == 0
    }
}

pub fn summarize(reports: &[ChunkReport]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_chunks: reports.len(),
        ..ValidationSummary::default()
    };
    for report in reports {
        summary.total_input_chars += report.input_chars;
        summary.total_output_chars += report.output_chars;
        summary.total_char_diff += report.char_diff;
        match report.status {
            ChunkStatus::Passed => summary.passed += 1,
            ChunkStatus::Mismatch => {
                summary.mismatched += 1;
                summary.mismatched_chunks.push(report.chunk_index);
            }
        }
    }
    summary
}

/// Devanagari content of one side of a comparison.
struct Extraction {
    text: String,
    chars: usize,
}

impl Extraction {
    fn of(payload: &str) -> Self {
        let cleaned = normalize_dandas(&clean_for_comparison(payload));
        let words = extract_devanagari_words(&cleaned);
        let text = words.join(" ");
        let chars = words.iter().map(|word| count_devanagari(word)).sum();
        Extraction { text, chars }
    }

    fn words(&self) -> Vec<&str> {
        self.text.split(' ').filter(|word| !word.is_empty()).collect()
    }
}

/// Compares original and converted chunks, logging diagnostics for mismatches.
#[derive(Debug, Clone)]
pub struct ChunkValidator {
    file_log_dir: PathBuf,
    options: ValidatorOptions,
}

impl ChunkValidator {
    /// Creates the validator and its log directory.
    pub fn new(file_log_dir: impl Into<PathBuf>, options: ValidatorOptions) -> Result<Self> {
        let file_log_dir = file_log_dir.into();
        std::fs::create_dir_all(&file_log_dir)?;
        Ok(ChunkValidator {
            file_log_dir,
            options,
        })
    }

    pub fn file_log_dir(&self) -> &Path {
        &self.file_log_dir
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Directory receiving the diagnostics of chunk `chunk_index`.
    pub fn chunk_log_dir(&self, chunk_index: usize) -> PathBuf {
        self.file_log_dir
            .join("chunks")
            .join(format!("chunk_{chunk_index}"))
    }

    pub fn validate_chunk(
        &self,
        original: &str,
        converted: &str,
        metadata: &ChunkMetadata,
    ) -> ChunkReport {
        let input = Extraction::of(original);
        let output = Extraction::of(converted);
        let char_diff = input.chars.abs_diff(output.chars);

        let tolerance = self.options.effective_tolerance();
        let passed = if tolerance == 0 {
            input.text == output.text
        } else {
            char_diff <= tolerance
        };
        let status = if passed {
            ChunkStatus::Passed
        } else {
            ChunkStatus::Mismatch
        };

        let report = ChunkReport {
            status,
            char_diff,
            input_chars: input.chars,
            output_chars: output.chars,
            chunk_index: metadata.chunk_index,
            description: metadata.description.clone(),
        };

        match status {
            ChunkStatus::Passed => {
                info!(
                    chunk = metadata.chunk_index,
                    chars = input.chars,
                    "devanagari preserved"
                );
            }
            ChunkStatus::Mismatch => {
                warn!(
                    chunk = metadata.chunk_index,
                    input_chars = input.chars,
                    output_chars = output.chars,
                    char_diff,
                    "devanagari mismatch"
                );
                self.write_diagnostics(&report, &input, &output);
            }
        }
        report
    }

    fn write_diagnostics(&self, report: &ChunkReport, input: &Extraction, output: &Extraction) {
        let dir = self.chunk_log_dir(report.chunk_index);
        let mut files: Vec<(&str, String)> = vec![
            ("input_devanagari.txt", input.text.clone()),
            ("output_devanagari.txt", output.text.clone()),
        ];
        if !self.options.no_diff {
            let input_words = input.words();
            let output_words = output.words();
            let ops = diff_words(&input_words, &output_words);
            files.push(("devanagari_diff.txt", render_diff(&ops, DIFF_CONTEXT)));
        }
        match serde_json::to_string_pretty(report) {
            Ok(json) => files.push(("report.json", json)),
            Err(e) => warn!(error = %e, "could not serialize chunk report"),
        }

        for (name, content) in files {
            let path = dir.join(name);
            if let Err(e) = write_file(&path, &content) {
                warn!(path = %path.display(), error = %e, "could not save validator log file");
            } else {
                debug!(path = %path.display(), "saved validator log file");
            }
        }
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
