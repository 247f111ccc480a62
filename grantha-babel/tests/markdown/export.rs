//! Export tests for Markdown format (Grantha → Markdown)

use crate::common::{commentary_with, two_level_grantha};
use grantha_babel::formats::markdown::frontmatter::split_frontmatter;
use grantha_babel::{
    to_markdown, GranthaBuilder, GranthaError, MarkdownOptions, MarkdownWriter, Passage,
    WriteOptions, Writer,
};
use insta::assert_snapshot;

fn body(markdown: &str) -> &str {
    split_frontmatter(markdown).expect("Should have frontmatter").body
}

#[test]
fn test_body_layout() {
    let grantha = GranthaBuilder::new("isha", &["Mantra"])
        .passage("1", &[("roman", "īśā vāsyam"), ("devanagari", "ईशा वास्यम्")])
        .passage("2", &[("devanagari", "कुर्वन्नेवेह")])
        .commentary_passage("bhashya", "1", &[("devanagari", "ईशा ईशिता")])
        .build()
        .unwrap();
    let output = to_markdown(&grantha).unwrap();

    assert_snapshot!(body(&output).trim(), @r##"
# Mantra 1

<!-- sanskrit:devanagari -->

ईशा वास्यम्

<!-- /sanskrit:devanagari -->

<!-- sanskrit:roman -->

īśā vāsyam

<!-- /sanskrit:roman -->

<!-- commentary: {"commentary_id":"bhashya","passage_ref":"1"} -->

## Commentary: 1

<!-- sanskrit:devanagari -->

ईशा ईशिता

<!-- /sanskrit:devanagari -->

<!-- /commentary: {"commentary_id":"bhashya"} -->

# Mantra 2

<!-- sanskrit:devanagari -->

कुर्वन्नेवेह

<!-- /sanskrit:devanagari -->
"##);
}

#[test]
fn test_one_heading_per_structural_segment() {
    let output = to_markdown(&two_level_grantha()).unwrap();
    let headings: Vec<&str> = body(&output)
        .lines()
        .filter(|line| line.starts_with('#'))
        .collect();
    assert_eq!(
        headings,
        vec![
            "# Chapter 1",
            "## Mantra 1.1",
            "## Mantra 1.2",
            "### Commentary: 1.2",
            "# Chapter 2",
            "## Mantra 2.1",
            "## Mantra 2.2",
        ]
    );
}

#[test]
fn test_siblings_sorted_numerically() {
    let grantha = GranthaBuilder::new("g", &["Mantra"])
        .passage("10", &[("devanagari", "क")])
        .passage("9", &[("devanagari", "ख")])
        .passage("1", &[("devanagari", "ग")])
        .build()
        .unwrap();
    let output = to_markdown(&grantha).unwrap();
    let headings: Vec<&str> = body(&output)
        .lines()
        .filter(|line| line.starts_with('#'))
        .collect();
    assert_eq!(headings, vec!["# Mantra 1", "# Mantra 9", "# Mantra 10"]);
}

#[test]
fn test_frontmatter_fields() {
    let output = to_markdown(&two_level_grantha()).unwrap();
    let split = split_frontmatter(&output).unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_str(split.yaml).unwrap();

    assert_eq!(yaml["grantha_id"].as_str(), Some("katha"));
    assert_eq!(yaml["structure_levels"][1]["key"].as_str(), Some("Mantra"));
    assert_eq!(
        yaml["commentaries_metadata"]["bhashya"]["commentary_title"].as_str(),
        Some("Kathopaniṣad Bhāṣya")
    );
    assert_eq!(yaml["hash_version"].as_u64(), Some(2));
    assert_eq!(yaml["validation_hash"].as_str().map(str::len), Some(64));
}

#[test]
fn test_prefatory_and_concluding_material() {
    let grantha = GranthaBuilder::new("g", &["Mantra"])
        .prefatory("0", &[("devanagari", "शान्तिपाठः")], &[("devanagari", "ॐ")])
        .passage("1", &[("devanagari", "अ")])
        .concluding("99", &[], &[("devanagari", "इति")])
        .build()
        .unwrap();
    let output = to_markdown(&grantha).unwrap();
    let text = body(&output);

    let prefatory = text.find("# Prefatory: 0 (devanagari: \"शान्तिपाठः\")").unwrap();
    let mantra = text.find("# Mantra 1").unwrap();
    let concluding = text.find("# Concluding: 99\n").unwrap();
    assert!(prefatory < mantra && mantra < concluding);
}

#[test]
fn test_script_selection() {
    let writer = MarkdownWriter::new(
        MarkdownOptions::default(),
        WriteOptions {
            scripts: Some(vec!["devanagari".to_string()]),
            commentaries: Some(vec![]),
        },
    );
    let output = writer.write(&two_level_grantha()).unwrap();
    assert!(!output.contains("sanskrit:roman"));
    assert!(!output.contains("Commentary:"));
    assert!(!output.contains("commentaries_metadata"));
}

#[test]
fn test_missing_script_is_reported() {
    let writer = MarkdownWriter::new(
        MarkdownOptions::default(),
        WriteOptions {
            scripts: Some(vec!["roman".to_string()]),
            commentaries: None,
        },
    );
    assert!(matches!(
        writer.write(&two_level_grantha()),
        Err(GranthaError::ScriptNotAvailable { .. })
    ));
}

#[test]
fn test_dangling_commentary_is_reported() {
    let mut grantha = two_level_grantha();
    grantha
        .commentaries
        .insert("tika".to_string(), commentary_with("tika", &[("3.1", "टीका")]));
    assert!(matches!(
        to_markdown(&grantha),
        Err(GranthaError::PassageNotFound(_))
    ));
}

#[test]
fn test_wrong_depth_is_reported() {
    let mut grantha = two_level_grantha();
    grantha.passages.push(Passage::new("3"));
    assert!(matches!(
        to_markdown(&grantha),
        Err(GranthaError::InvalidRef(_))
    ));
}

#[test]
fn test_write_to_path_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("katha.md");
    MarkdownWriter::default()
        .write_to_path(&two_level_grantha(), &path)
        .unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_markdown(&two_level_grantha()).unwrap());
}
