//! Conversion between grantha markdown sources and the canonical document model
//!
//!     This crate reads structured scriptural texts ("granthas") authored as flat markdown
//!     documents and turns them into a nested, reference-keyed model that can be written back
//!     out as JSON or markdown.
//!
//!     TLDR:
//!         - Markdown is the authoring format, JSON is the machine format.
//!         - Everything goes through the canonical model in ./model.rs.
//!         - The flat markdown stream is keyed by dotted references (1.2.3); the nesting
//!           is rebuilt on demand by the hierarchy builder in ./common/hierarchy.rs.
//!         - Validation of transformation steps (transliteration, AI-assisted cleanup) is done
//!           on extracted Devanagari content, see ./validator.
//!
//! Architecture
//!
//!     The markdown source is flat: headings carry references, HTML comments delimit script
//!     blocks and commentary attachments. The parser walks that stream once and produces the
//!     model; writers go the other way. Shared logic lives in ./common:
//!
//!     - hierarchy.rs: flat passage list -> tree, numeric-aware sibling ordering
//!     - merge.rs: frontmatter commentary metadata + inline commentary attachments
//!     - devanagari.rs: Devanagari extraction used by hashing and validation
//!
//!     This is a pure lib. It never assumes a shell: no printing, no env vars. Logging goes
//!     through `tracing`, and installing a subscriber is the embedding application's job.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── model.rs                # Grantha, Passage, Commentary
//!     ├── reference.rs            # dotted reference parsing and ordering
//!     ├── builder.rs              # fluent construction of a Grantha
//!     ├── format.rs               # Writer trait and the closed OutputFormat set
//!     ├── formats
//!     │   ├── markdown            # parser.rs, serializer.rs, frontmatter.rs
//!     │   └── json
//!     ├── common                  # hierarchy builder, metadata merge, devanagari
//!     ├── hash.rs                 # validation_hash over Devanagari content
//!     ├── integrity.rs            # whole-document checks
//!     └── validator               # chunk fidelity validator
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common                  # shared fixtures
//!     ├── markdown                # import/export/round-trip
//!     ├── json
//!     └── validator.rs
//!
//! Core Algorithms
//!
//!     The hard part is the structural mapping. Going in, the flat stream of headings and
//!     comment-delimited blocks becomes an ordered passage list plus commentaries. Going out,
//!     the passage list is folded into a tree by reference segments and walked in sorted order
//!     so that one heading is emitted per structural segment.
//!
//!     Passage order in the model is authoritative. The only reordering that ever happens is
//!     the numeric-aware sibling sort performed while writing markdown.
pub mod builder;
pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod hash;
pub mod integrity;
pub mod model;
pub mod reference;
pub mod validator;

pub use builder::GranthaBuilder;
pub use error::{GranthaError, Result};
pub use format::{OutputFormat, WriteOptions, Writer};
pub use formats::json::{JsonOptions, JsonWriter};
pub use formats::markdown::{MarkdownOptions, MarkdownWriter};
pub use model::{Commentary, CommentaryPassage, Grantha, Passage, StructureLevel};
pub use hash::{hash_grantha, hash_text, HASH_VERSION};
pub use integrity::{validate_all, IntegrityReport};
pub use validator::{
    summarize, ChunkMetadata, ChunkReport, ChunkStatus, ChunkValidator, ValidationSummary,
    ValidatorOptions,
};

/// Parses a grantha markdown document with default options.
pub fn parse_markdown(source: &str) -> Result<Grantha> {
    formats::markdown::parser::parse_from_markdown(source, &MarkdownOptions::default())
}

/// Parses a grantha JSON document.
pub fn parse_json(source: &str) -> Result<Grantha> {
    formats::json::parse_from_json(source)
}

/// Serializes a grantha to markdown with default options.
pub fn to_markdown(grantha: &Grantha) -> Result<String> {
    MarkdownWriter::default().write(grantha)
}

/// Serializes a grantha to JSON with default options.
pub fn to_json(grantha: &Grantha) -> Result<String> {
    JsonWriter::default().write(grantha)
}
