//! Whole-document integrity checks
//!
//! Unlike [`Grantha::validate`], which stops at the first problem, these checks all run and
//! each reports its own outcome. Useful for auditing a corpus where a document should be
//! described, not rejected.

use crate::hash::hash_grantha;
use crate::model::Grantha;
use crate::reference::parse_ref;
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        CheckResult {
            name,
            passed: true,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        CheckResult {
            name,
            passed: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub checks: Vec<CheckResult>,
}

impl IntegrityReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

/// Runs every check. `expected_hash` is a content hash recorded earlier with
/// [`hash_grantha`]; `None` skips the comparison.
pub fn validate_all(grantha: &Grantha, expected_hash: Option<&str>) -> IntegrityReport {
    IntegrityReport {
        checks: vec![
            structure_completeness(grantha),
            refs_unique(grantha),
            commentary_refs_exist(grantha),
            hash_integrity(grantha, expected_hash),
        ],
    }
}

/// Every passage reference has one segment per structure level.
pub fn structure_completeness(grantha: &Grantha) -> CheckResult {
    const NAME: &str = "structure_completeness";
    if grantha.structure_levels.is_empty() {
        return CheckResult::fail(NAME, "no structure levels declared");
    }
    let invalid: Vec<&str> = grantha
        .refs()
        .filter(|reference| parse_ref(reference, grantha.depth()).is_err())
        .collect();
    if invalid.is_empty() {
        CheckResult::pass(NAME, "all passage refs follow the structure levels")
    } else {
        CheckResult::fail(NAME, format!("invalid refs: {}", invalid.join(", ")))
    }
}

pub fn refs_unique(grantha: &Grantha) -> CheckResult {
    const NAME: &str = "refs_unique";
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = grantha
        .refs()
        .filter(|reference| !seen.insert(*reference))
        .collect();
    if duplicates.is_empty() {
        CheckResult::pass(
            NAME,
            format!("all {} passage refs are unique", grantha.passages.len()),
        )
    } else {
        CheckResult::fail(NAME, format!("duplicate refs: {}", duplicates.join(", ")))
    }
}

/// Every commentary entry points at an existing passage.
pub fn commentary_refs_exist(grantha: &Grantha) -> CheckResult {
    const NAME: &str = "commentary_refs_exist";
    if grantha.commentaries.is_empty() {
        return CheckResult::pass(NAME, "no commentaries to check");
    }
    let refs: HashSet<&str> = grantha.refs().collect();
    let dangling: Vec<String> = grantha
        .commentaries
        .iter()
        .flat_map(|(id, commentary)| {
            commentary
                .passages
                .iter()
                .filter(|entry| !refs.contains(entry.reference.as_str()))
                .map(move |entry| format!("{id}:{}", entry.reference))
        })
        .collect();
    if dangling.is_empty() {
        CheckResult::pass(NAME, "all commentary refs match passage refs")
    } else {
        CheckResult::fail(NAME, format!("dangling commentary refs: {}", dangling.join(", ")))
    }
}

pub fn hash_integrity(grantha: &Grantha, expected_hash: Option<&str>) -> CheckResult {
    const NAME: &str = "hash_integrity";
    let Some(expected) = expected_hash else {
        return CheckResult::pass(NAME, "no hash to check");
    };
    let computed = hash_grantha(grantha);
    if computed == expected {
        CheckResult::pass(NAME, "content hash matches")
    } else {
        CheckResult::fail(
            NAME,
            format!(
                "hash mismatch: computed={}…, stored={}…",
                &computed[..16],
                expected.get(..16).unwrap_or(expected)
            ),
        )
    }
}
