//! Dotted passage references
//!
//! A reference such as `1.2.3` locates a passage in the grantha's structure. It has one
//! segment per structure level. Segments are usually numbers but may be opaque labels,
//! so ordering goes through [`compare_segments`] rather than plain string comparison.

use crate::error::{GranthaError, Result};
use std::cmp::Ordering;

/// Splits a reference into its segments, checking it has exactly `depth` of them.
pub fn parse_ref(reference: &str, depth: usize) -> Result<Vec<&str>> {
    let segments = split_ref(reference)?;
    if segments.len() != depth {
        return Err(GranthaError::InvalidRef(format!(
            "'{reference}' has {} segments, expected {depth}",
            segments.len()
        )));
    }
    Ok(segments)
}

/// Splits a reference into segments without checking the depth.
pub fn split_ref(reference: &str) -> Result<Vec<&str>> {
    if reference.trim().is_empty() {
        return Err(GranthaError::InvalidRef(
            "reference cannot be empty".to_string(),
        ));
    }
    let segments: Vec<&str> = reference.split('.').collect();
    for segment in &segments {
        if segment.is_empty() || segment.chars().any(char::is_whitespace) {
            return Err(GranthaError::InvalidRef(format!(
                "'{reference}' contains an unparseable segment '{segment}'"
            )));
        }
    }
    Ok(segments)
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Orders two reference segments.
///
/// All-digit segments compare by integer value and sort before any non-numeric segment.
/// Numeric ties ("01" vs "1") fall back to string order; non-numeric segments compare
/// byte-wise. Values are compared on their digits, so arbitrarily long numbers are fine.
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => {
            let a_digits = a.trim_start_matches('0');
            let b_digits = b.trim_start_matches('0');
            a_digits
                .len()
                .cmp(&b_digits.len())
                .then_with(|| a_digits.cmp(b_digits))
                .then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Orders two references segment by segment; a prefix sorts before its extensions.
pub fn compare_refs(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => match compare_segments(x, y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// Splits a range like `1.1.1-5` into its start and end.
///
/// The end may be abbreviated: `1.1.1-5` means `1.1.1` to `1.1.5`. A plain reference is
/// a range of one.
pub fn parse_ref_range(range: &str) -> Result<(String, String)> {
    let Some((start, end)) = range.split_once('-') else {
        split_ref(range)?;
        return Ok((range.trim().to_string(), range.trim().to_string()));
    };
    if end.contains('-') {
        return Err(GranthaError::InvalidRef(format!(
            "invalid range format: {range}"
        )));
    }
    let start = start.trim();
    let end = end.trim();
    let start_segments = split_ref(start)?;
    let end_segments = split_ref(end)?;
    if end_segments.len() > start_segments.len() {
        return Err(GranthaError::InvalidRef(format!(
            "range end '{end}' is deeper than its start '{start}'"
        )));
    }
    let keep = start_segments.len() - end_segments.len();
    let mut full_end: Vec<&str> = start_segments[..keep].to_vec();
    full_end.extend(end_segments);
    Ok((start.to_string(), full_end.join(".")))
}

/// Whether `reference` falls inside the inclusive range `start..=end`.
pub fn is_ref_in_range(reference: &str, start: &str, end: &str) -> bool {
    compare_refs(start, reference) != Ordering::Greater
        && compare_refs(reference, end) != Ordering::Greater
}
