//! Frontmatter handling across the markdown reader and writer

use grantha_babel::{parse_markdown, to_markdown, GranthaError};

const NESTED: &str = r#"---
grantha_id: mundaka
canonical_title: मुण्डकोपनिषत्
part_num: 1
structure_levels:
  - key: Mundaka
    scriptNames:
      devanagari: मुण्डकम्
    children:
      - key: Khanda
        children:
          - key: Mantra
commentaries_metadata:
  - commentary_id: bhashya
    commentary_title: Bhāṣya
    commentator: शङ्कराचार्यः
---

# Mundaka 1

## Khanda 1.1

### Mantra 1.1.1

ब्रह्मा देवानां प्रथमः सम्बभूव
"#;

#[test]
fn test_nested_levels_are_flattened() {
    let grantha = parse_markdown(NESTED).expect("Should parse markdown");
    let keys: Vec<&str> = grantha
        .structure_levels
        .iter()
        .map(|level| level.key.as_str())
        .collect();
    assert_eq!(keys, vec!["Mundaka", "Khanda", "Mantra"]);
    assert_eq!(grantha.structure_levels[0].script_names["devanagari"], "मुण्डकम्");
    assert_eq!(grantha.passages[0].reference, "1.1.1");
    assert_eq!(grantha.part_num, Some(1));
}

#[test]
fn test_plain_strings_use_default_script() {
    let grantha = parse_markdown(NESTED).expect("Should parse markdown");
    assert_eq!(grantha.canonical_title["devanagari"], "मुण्डकोपनिषत्");
    let commentary = grantha.commentary("bhashya").unwrap();
    assert_eq!(commentary.commentator["devanagari"], "शङ्कराचार्यः");
    assert_eq!(commentary.commentary_title.as_deref(), Some("Bhāṣya"));
    assert!(commentary.passages.is_empty());
}

#[test]
fn test_writer_emits_flat_shapes() {
    let grantha = parse_markdown(NESTED).expect("Should parse markdown");
    let output = to_markdown(&grantha).unwrap();
    assert!(!output.contains("children"));
    assert!(output.contains("commentaries_metadata:\n  bhashya:"));

    let reparsed = parse_markdown(&output).expect("Should parse written markdown");
    assert_eq!(reparsed, grantha);
}

#[test]
fn test_duplicate_level_keys_are_rejected() {
    let md = "---\ngrantha_id: g\nstructure_levels:\n  - key: Mantra\n  - key: mantra\n---\n";
    assert!(matches!(
        parse_markdown(md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_empty_structure_is_rejected() {
    let md = "---\ngrantha_id: g\nstructure_levels: []\n---\n";
    assert!(matches!(
        parse_markdown(md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let md = "---\ngrantha_id: [unclosed\n---\n";
    assert!(matches!(
        parse_markdown(md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_unsupported_hash_version_is_rejected() {
    let md = "---\ngrantha_id: g\nstructure_levels:\n  - key: Mantra\nhash_version: 1\nvalidation_hash: 'abc'\n---\n";
    assert!(matches!(
        parse_markdown(md),
        Err(GranthaError::Validation(_))
    ));
}
