//! Format implementations
//!
//! This module contains the formats that convert between the grantha model and its
//! text representations.

pub mod json;
pub mod markdown;

pub use json::JsonWriter;
pub use markdown::MarkdownWriter;
