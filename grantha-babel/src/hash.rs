//! Content hashing for lossless-conversion checks
//!
//! The hash covers the extracted Devanagari text only (see `common::devanagari`), so
//! reformatting, other scripts and translations never change it. Bump [`HASH_VERSION`]
//! whenever extraction changes in a way that changes hashes for the same input.

use crate::common::devanagari::extract_devanagari;
use crate::model::Grantha;
use sha2::{Digest, Sha256};

/// Version of the extraction and hashing scheme written as `hash_version`.
pub const HASH_VERSION: u32 = 2;

/// Hex SHA-256 of the Devanagari words of `text`, joined with single spaces.
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(extract_devanagari(text).as_bytes());
    format!("{digest:x}")
}

/// Hash of every passage's text: prefatory material, passages, then concluding material.
pub fn hash_grantha(grantha: &Grantha) -> String {
    let texts: Vec<&str> = grantha
        .prefatory_material
        .iter()
        .chain(&grantha.passages)
        .chain(&grantha.concluding_material)
        .flat_map(|passage| passage.scripts.values().map(String::as_str))
        .collect();
    hash_text(&texts.join("\n"))
}
