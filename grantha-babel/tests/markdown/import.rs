//! Import tests for Markdown format (Markdown → Grantha)

use crate::common::fixture;
use grantha_babel::formats::markdown::parser::parse_from_markdown;
use grantha_babel::{parse_markdown, GranthaError, MarkdownOptions};

const TWO_LEVELS: &str = "---\ngrantha_id: test\nstructure_levels:\n  - key: Chapter\n  - key: Mantra\n";

fn document(frontmatter_extra: &str, body: &str) -> String {
    format!("{TWO_LEVELS}{frontmatter_extra}---\n{body}")
}

#[test]
fn test_reads_fixture() {
    let grantha = parse_markdown(&fixture("isha.md")).expect("Should parse fixture");

    assert_eq!(grantha.grantha_id, "isha-upanishad");
    assert_eq!(grantha.canonical_title["roman"], "Īśopaniṣat");
    assert_eq!(grantha.text_type.as_deref(), Some("upanishad"));
    assert_eq!(grantha.structure_levels[0].script_names["devanagari"], "मन्त्रः");

    let refs: Vec<&str> = grantha.refs().collect();
    assert_eq!(refs, vec!["1", "2"]);
    let first = &grantha.passages[0];
    assert_eq!(
        first.scripts["devanagari"],
        "ईशा वास्यमिदं सर्वं यत्किञ्च जगत्यां जगत् ।\nतेन त्यक्तेन भुञ्जीथा मा गृधः कस्यस्विद्धनम् ॥ १ ॥"
    );
    assert_eq!(first.metadata["meter"], "anushtubh");
    assert_eq!(
        grantha.passage_text("2", "devanagari").unwrap(),
        "कुर्वन्नेवेह कर्माणि जिजीविषेच्छतं समाः ।"
    );
}

#[test]
fn test_reads_fixture_material_and_commentary() {
    let grantha = parse_markdown(&fixture("isha.md")).expect("Should parse fixture");

    assert_eq!(grantha.prefatory_material.len(), 1);
    let prefatory = &grantha.prefatory_material[0];
    assert_eq!(prefatory.reference, "0");
    assert_eq!(prefatory.label["devanagari"], "शान्तिपाठः");
    assert!(prefatory.scripts["devanagari"].starts_with("ॐ पूर्णमदः"));
    assert_eq!(grantha.concluding_material[0].label["devanagari"], "इति ईशोपनिषत्");

    let commentary = grantha.commentary("shankara-bhashya").unwrap();
    assert_eq!(commentary.commentator["roman"], "Śaṅkarācārya");
    assert_eq!(commentary.passages.len(), 1);
    assert_eq!(
        commentary.passages[0].scripts["devanagari"],
        "ईशा ईशिता परमेश्वरः परमात्मा सर्वस्य ।"
    );
}

#[test]
fn test_metadata_merge_scenario() {
    let md = document(
        "commentaries_metadata:\n  test-commentary:\n    commentary_title: Test Title\n    commentator:\n      devanagari: Test Commentator\n",
        r#"
# Chapter 1

## Mantra 1.1

<!-- sanskrit:devanagari -->
अग्निमीळे पुरोहितम्
<!-- /sanskrit:devanagari -->

<!-- commentary: {"commentary_id":"test-commentary","passage_ref":"1.1"} -->

### Commentary: 1.1

<!-- sanskrit:devanagari -->
अग्निं ईडे स्तौमि
<!-- /sanskrit:devanagari -->

<!-- /commentary: {"commentary_id":"test-commentary"} -->
"#,
    );
    let grantha = parse_markdown(&md).expect("Should parse markdown");

    assert_eq!(grantha.commentaries.len(), 1);
    let commentary = &grantha.commentaries["test-commentary"];
    assert_eq!(commentary.commentary_title.as_deref(), Some("Test Title"));
    assert_eq!(commentary.commentator["devanagari"], "Test Commentator");
    assert_eq!(commentary.passages[0].reference, "1.1");
    assert_eq!(commentary.passages[0].scripts["devanagari"], "अग्निं ईडे स्तौमि");
}

#[test]
fn test_inline_only_commentary_has_empty_metadata() {
    let md = document(
        "",
        "\n## Mantra 1.1\n\nअ\n\n<!-- commentary: {\"commentary_id\":\"tika\",\"passage_ref\":\"1.1\"} -->\n\n### Commentary: 1.1\n\nटीका\n",
    );
    let grantha = parse_markdown(&md).expect("Should parse markdown");
    let commentary = grantha.commentary("tika").unwrap();
    assert!(commentary.commentary_title.is_none());
    assert!(commentary.commentator.is_empty());
    assert_eq!(commentary.passages[0].scripts["devanagari"], "टीका");
}

#[test]
fn test_frontmatter_only_commentary_has_no_passages() {
    let md = document(
        "commentaries_metadata:\n  unused:\n    commentary_title: Unused\n",
        "\n## Mantra 1.1\n\nअ\n",
    );
    let grantha = parse_markdown(&md).expect("Should parse markdown");
    assert!(grantha.commentary("unused").unwrap().passages.is_empty());
}

#[test]
fn test_dangling_commentary_ref_is_rejected() {
    let md = document(
        "",
        "\n## Mantra 1.1\n\nअ\n\n<!-- commentary: {\"commentary_id\":\"c\",\"passage_ref\":\"1.9\"} -->\n\n### Commentary: 1.9\n\nइ\n",
    );
    assert!(matches!(
        parse_markdown(&md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_duplicate_passage_is_rejected() {
    let md = document("", "\n## Mantra 1.1\n\nअ\n\n## Mantra 1.1\n\nआ\n");
    assert!(matches!(
        parse_markdown(&md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_invalid_heading_ref_reports_line() {
    let md = document("", "\n# Chapter 1\n\n## Mantra 1\n");
    match parse_markdown(&md) {
        Err(GranthaError::InvalidRef(message)) => assert!(message.starts_with("line 10:")),
        other => panic!("Expected InvalidRef, got {other:?}"),
    }
}

#[test]
fn test_missing_frontmatter_is_rejected() {
    assert!(matches!(
        parse_markdown("# Mantra 1\n\nअ\n"),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_missing_grantha_id_is_rejected() {
    let md = "---\nstructure_levels:\n  - key: Mantra\n---\n\n# Mantra 1\n";
    assert!(matches!(
        parse_markdown(md),
        Err(GranthaError::Validation(_))
    ));
}

#[test]
fn test_non_structural_headings_are_ignored() {
    let md = document("", "\n# Introduction\n\nSome notes.\n\n## Mantra 1.1\n\nअ\n");
    let grantha = parse_markdown(&md).expect("Should parse markdown");
    assert_eq!(grantha.passages.len(), 1);
    assert_eq!(grantha.passages[0].scripts["devanagari"], "अ");
}

#[test]
fn test_custom_script_prefix() {
    let options = MarkdownOptions {
        script_tag_prefix: "text".to_string(),
        ..MarkdownOptions::default()
    };
    let md = document(
        "",
        "\n## Mantra 1.1\n\n<!-- text:roman -->\nagnim\n<!-- /text:roman -->\n",
    );
    let grantha = parse_from_markdown(&md, &options).expect("Should parse markdown");
    assert_eq!(grantha.passages[0].scripts["roman"], "agnim");
    assert!(!grantha.passages[0].scripts.contains_key("devanagari"));
}

#[test]
fn test_tampered_body_fails_hash_check() {
    let written = grantha_babel::to_markdown(&crate::common::two_level_grantha()).unwrap();
    let tampered = written.replace("तं ह कुमारं सन्तम्", "तं ह कुमारम्");
    assert!(matches!(
        parse_markdown(&tampered),
        Err(GranthaError::Validation(_))
    ));

    let lenient = MarkdownOptions {
        verify_validation_hash: false,
        ..MarkdownOptions::default()
    };
    let grantha = parse_from_markdown(&tampered, &lenient).expect("Should parse without check");
    assert_eq!(grantha.passage_text("1.2", "devanagari").unwrap(), "तं ह कुमारम्");
}

#[test]
fn test_fixture_passes_integrity_checks() {
    let grantha = parse_markdown(&fixture("isha.md")).expect("Should parse fixture");
    let expected = grantha_babel::hash_grantha(&grantha);
    let report = grantha_babel::validate_all(&grantha, Some(&expected));
    assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
}
