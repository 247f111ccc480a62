//! Devanagari extraction
//!
//! Content fidelity is judged on Devanagari alone (U+0900 to U+097F): markup, other
//! scripts and translations may legitimately change during conversion, the Devanagari text
//! may not. Both the content hash and the chunk validator go through these functions.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex for HTML comments"));

pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Maximal runs of Devanagari characters, in order.
pub fn extract_devanagari_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !is_devanagari(c))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Devanagari runs joined with single spaces.
///
/// ```text
/// "अग्निमीळे English पुरोहितं" -> "अग्निमीळे पुरोहितं"
/// ```
pub fn extract_devanagari(text: &str) -> String {
    extract_devanagari_words(text).join(" ")
}

/// Number of Devanagari characters in `text`.
pub fn count_devanagari(text: &str) -> usize {
    text.chars().filter(|c| is_devanagari(*c)).count()
}

/// Rewrites the double danda `॥` as two single dandas.
pub fn normalize_dandas(text: &str) -> String {
    text.replace('\u{0965}', "\u{0964}\u{0964}")
}

/// Drops everything that is markup rather than content before a comparison: a leading
/// frontmatter block, HTML comments, heading lines and `**` emphasis markers.
pub fn clean_for_comparison(text: &str) -> String {
    let body = strip_frontmatter(text);
    let without_comments = HTML_COMMENT.replace_all(body, "");
    let without_headings: Vec<&str> = without_comments
        .split('\n')
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    without_headings.join("\n").replace("**", "")
}

fn strip_frontmatter(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let Some(rest) = trimmed.strip_prefix("---") else {
        return text;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + 4..];
            after.split_once('\n').map_or("", |(_, body)| body)
        }
        None => text,
    }
}
