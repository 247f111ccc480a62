//! Shared fixtures, plus the hierarchy builder properties.

use grantha_babel::common::hierarchy::{build_hierarchy_tree, sort_tree_keys, TreeNode};
use grantha_babel::{Commentary, CommentaryPassage, Grantha, GranthaBuilder, Passage};
use proptest::prelude::*;
use std::path::PathBuf;

/// Reads a file from `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

/// Two chapters of two mantras, one commentary on 1.2.
pub fn two_level_grantha() -> Grantha {
    GranthaBuilder::new("katha", &["Chapter", "Mantra"])
        .title("devanagari", "कठोपनिषत्")
        .passage(
            "1.1",
            &[
                ("devanagari", "उशन् ह वै वाजश्रवसः"),
                ("roman", "uśan ha vai vājaśravasaḥ"),
            ],
        )
        .passage("1.2", &[("devanagari", "तं ह कुमारं सन्तम्")])
        .passage("2.1", &[("devanagari", "अन्यच्छ्रेयोऽन्यदुतैव प्रेयः")])
        .passage("2.2", &[("devanagari", "श्रेयश्च प्रेयश्च मनुष्यमेतः")])
        .commentary(
            "bhashya",
            Some("Kathopaniṣad Bhāṣya"),
            &[("devanagari", "शङ्कराचार्यः")],
        )
        .commentary_passage("bhashya", "1.2", &[("devanagari", "तं ह नचिकेतसम्")])
        .build()
        .expect("fixture grantha to be valid")
}

pub fn commentary_with(id: &str, entries: &[(&str, &str)]) -> Commentary {
    let mut commentary = Commentary::new(id);
    for (reference, text) in entries {
        commentary
            .passages
            .push(CommentaryPassage::new(*reference).with_script("devanagari", *text));
    }
    commentary
}

fn collect_terminal<'a>(
    node: &TreeNode<'a>,
    path: &mut Vec<String>,
    out: &mut Vec<(String, &'a Passage)>,
) {
    for passage in &node.passages {
        out.push((path.join("."), *passage));
    }
    for (key, child) in &node.children {
        path.push(key.clone());
        collect_terminal(child, path, out);
        path.pop();
    }
}

fn refs_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(
            prop_oneof![(0u32..30).prop_map(|n| n.to_string()), "[a-c]{1,2}"],
            1..4,
        )
        .prop_map(|segments| segments.join(".")),
        0..40,
    )
}

proptest! {
    #[test]
    fn tree_places_every_passage_once(refs in refs_strategy()) {
        let passages: Vec<Passage> = refs.iter().map(|r| Passage::new(r.as_str())).collect();
        let tree = build_hierarchy_tree(&passages);

        prop_assert_eq!(tree.passage_count(), passages.len());

        let mut found = Vec::new();
        collect_terminal(&tree, &mut Vec::new(), &mut found);
        prop_assert_eq!(found.len(), passages.len());
        for (path, passage) in found {
            prop_assert_eq!(path, passage.reference.clone());
        }
        for passage in &passages {
            let node = tree.descend(passage.reference.split('.'));
            prop_assert!(node.is_some());
        }
    }

    #[test]
    fn sorted_keys_are_a_permutation(refs in refs_strategy()) {
        let passages: Vec<Passage> = refs.iter().map(|r| Passage::new(r.as_str())).collect();
        let tree = build_hierarchy_tree(&passages);
        let mut sorted: Vec<&str> = sort_tree_keys(&tree);
        let again = sort_tree_keys(&tree);
        prop_assert_eq!(&sorted, &again);

        let mut original: Vec<&str> = tree.children.iter().map(|(k, _)| k.as_str()).collect();
        original.sort_unstable();
        sorted.sort_unstable();
        prop_assert_eq!(original, sorted);
    }
}

#[test]
fn sort_is_numeric_not_lexical() {
    let passages: Vec<Passage> = ["10", "2", "1"].into_iter().map(Passage::new).collect();
    let tree = build_hierarchy_tree(&passages);
    assert_eq!(sort_tree_keys(&tree), vec!["1", "2", "10"]);
}

#[test]
fn numbers_sort_before_labels() {
    let passages: Vec<Passage> = ["intro", "10", "a", "02", "2"]
        .into_iter()
        .map(Passage::new)
        .collect();
    let tree = build_hierarchy_tree(&passages);
    assert_eq!(sort_tree_keys(&tree), vec!["02", "2", "10", "a", "intro"]);
}

#[test]
fn fixture_grantha_builds() {
    let grantha = two_level_grantha();
    assert_eq!(grantha.passages.len(), 4);
    let tree = build_hierarchy_tree(&grantha.passages);
    assert_eq!(sort_tree_keys(&tree), vec!["1", "2"]);
    assert_eq!(tree.descend(["2", "1"]).unwrap().passages.len(), 1);
}
