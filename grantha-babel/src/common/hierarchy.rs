//! Builds a nested tree from a flat, ordered passage list.
//!
//! # The High-Level Concept
//!
//! The model keeps passages as a flat list in document order. Formats that express the
//! hierarchy through nesting (markdown headings, one per structural segment) need the tree
//! back. Each passage reference is a path: `1.2.3` walks from the root through child `1`,
//! then `2`, and terminates at `3`, where the passage is attached.
//!
//! # The Algorithm
//!
//! 1. **Initialization:** create an empty root node.
//! 2. **For each passage, in input order:**
//!    - Split the reference into segments.
//!    - Starting from the root, look up the child keyed by the next segment, creating an
//!      empty one if it does not exist yet.
//!    - At the last segment, append the passage to that node's `passages`.
//! 3. **Completion:** the root holds the full tree. Children keep first-seen order;
//!    consumers that need canonical order ask for it with [`sort_tree_keys`].
//!
//! Every passage ends up at exactly one terminal node, so the number of passages across
//! the tree always equals the input length.
//!
//! # Ordering
//!
//! Structural segments are mostly numeric strings, where lexical order is wrong ("10"
//! before "2"). Sibling keys are ordered with [`compare_segments`]: numbers by value and
//! before any non-numeric label, labels byte-wise.

use crate::model::Passage;
use crate::reference::compare_segments;

/// A node of the transient hierarchy tree.
///
/// Children are held in a small vector in first-seen order and looked up by exact key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub passages: Vec<&'a Passage>,
    pub children: Vec<(String, TreeNode<'a>)>,
}

impl<'a> TreeNode<'a> {
    pub fn new() -> Self {
        TreeNode {
            passages: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(&self, key: &str) -> Option<&TreeNode<'a>> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn child_or_insert(&mut self, key: &str) -> &mut TreeNode<'a> {
        let index = match self.children.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.children.push((key.to_string(), TreeNode::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    /// Follows `path` from this node.
    pub fn descend<'k>(&self, path: impl IntoIterator<Item = &'k str>) -> Option<&TreeNode<'a>> {
        path.into_iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Number of passages attached anywhere in this subtree.
    pub fn passage_count(&self) -> usize {
        self.passages.len()
            + self
                .children
                .iter()
                .map(|(_, child)| child.passage_count())
                .sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds the hierarchy tree for `passages`, preserving their relative order.
pub fn build_hierarchy_tree(passages: &[Passage]) -> TreeNode<'_> {
    let mut root = TreeNode::new();
    for passage in passages {
        let mut current = &mut root;
        for segment in passage.reference.split('.') {
            current = current.child_or_insert(segment);
        }
        current.passages.push(passage);
    }
    root
}

/// The direct child keys of `node`, in numeric-aware order.
pub fn sort_tree_keys<'n>(node: &'n TreeNode<'_>) -> Vec<&'n str> {
    let mut keys: Vec<&str> = node.children.iter().map(|(k, _)| k.as_str()).collect();
    keys.sort_by(|a, b| compare_segments(a, b));
    keys
}
