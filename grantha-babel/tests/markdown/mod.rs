//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ Grantha conversion.

mod export;
mod frontmatter;
mod import;
