//! JSON format tests

use crate::common::{fixture, two_level_grantha};
use grantha_babel::{
    parse_json, parse_markdown, to_json, GranthaError, JsonOptions, JsonWriter, OutputFormat,
    WriteOptions, Writer,
};
use serde_json::Value;

#[test]
fn test_markdown_to_json_schema() {
    let grantha = parse_markdown(&fixture("isha.md")).expect("Should parse fixture");
    let value: Value = serde_json::from_str(&to_json(&grantha).unwrap()).unwrap();

    assert_eq!(value["grantha_id"], "isha-upanishad");
    assert_eq!(value["structure_levels"][0]["key"], "Mantra");
    assert_eq!(value["passages"][1]["ref"], "2");
    assert_eq!(value["passages"][0]["metadata"]["meter"], "anushtubh");
    assert_eq!(value["prefatory_material"][0]["ref"], "0");

    let commentary = &value["commentaries"]["shankara-bhashya"];
    assert_eq!(commentary["commentator"]["devanagari"], "शङ्कराचार्यः");
    assert_eq!(commentary["passages"][0]["ref"], "1");
}

#[test]
fn test_json_round_trip() {
    let original = two_level_grantha();
    let parsed = parse_json(&to_json(&original).unwrap()).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_json_keeps_passage_order() {
    let mut grantha = two_level_grantha();
    grantha.passages.reverse();
    let value: Value = serde_json::from_str(&to_json(&grantha).unwrap()).unwrap();
    let refs: Vec<&str> = value["passages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["ref"].as_str())
        .collect();
    assert_eq!(refs, vec!["2.2", "2.1", "1.2", "1.1"]);
}

#[test]
fn test_commentary_selection() {
    let writer = JsonWriter::new(
        JsonOptions::default(),
        WriteOptions {
            scripts: None,
            commentaries: Some(vec!["missing".to_string()]),
        },
    );
    assert!(matches!(
        writer.write(&two_level_grantha()),
        Err(GranthaError::CommentaryNotFound(_))
    ));
}

#[test]
fn test_output_format_writers() {
    let grantha = two_level_grantha();
    let dir = tempfile::tempdir().unwrap();
    for format in OutputFormat::ALL {
        let path = dir
            .path()
            .join(format!("katha.{}", format.file_extensions()[0]));
        let detected = OutputFormat::from_filename(path.to_str().unwrap()).unwrap();
        assert_eq!(detected, format);
        detected
            .writer(WriteOptions::default())
            .write_to_path(&grantha, &path)
            .unwrap();
    }

    let json = std::fs::read_to_string(dir.path().join("katha.json")).unwrap();
    let markdown = std::fs::read_to_string(dir.path().join("katha.md")).unwrap();
    assert_eq!(parse_json(&json).unwrap(), parse_markdown(&markdown).unwrap());
}
