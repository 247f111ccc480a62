//! Word-level diff of two Devanagari extractions, for mismatch diagnostics.

/// One step of an edit script from input words to output words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp<'a> {
    Equal(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Longest-common-subsequence table size above which the middle section is reported as a
/// plain replacement.
const MAX_TABLE_CELLS: usize = 4_000_000;

/// Edit script turning `input` into `output`.
pub fn diff_words<'a>(input: &[&'a str], output: &[&'a str]) -> Vec<DiffOp<'a>> {
    let prefix = input
        .iter()
        .zip(output)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = input[prefix..]
        .iter()
        .rev()
        .zip(output[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut ops: Vec<DiffOp<'a>> = input[..prefix].iter().map(|&w| DiffOp::Equal(w)).collect();
    let left = &input[prefix..input.len() - suffix];
    let right = &output[prefix..output.len() - suffix];
    if left.len().saturating_mul(right.len()) > MAX_TABLE_CELLS {
        ops.extend(left.iter().map(|&w| DiffOp::Removed(w)));
        ops.extend(right.iter().map(|&w| DiffOp::Added(w)));
    } else {
        ops.extend(lcs_diff(left, right));
    }
    ops.extend(input[input.len() - suffix..].iter().map(|&w| DiffOp::Equal(w)));
    ops
}

fn lcs_diff<'a>(left: &[&'a str], right: &[&'a str]) -> Vec<DiffOp<'a>> {
    let (n, m) = (left.len(), right.len());
    // lengths[i][j]: LCS length of left[i..] and right[j..]
    let mut lengths = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if left[i] == right[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if left[i] == right[j] {
            ops.push(DiffOp::Equal(left[i]));
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            ops.push(DiffOp::Removed(left[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Added(right[j]));
            j += 1;
        }
    }
    ops.extend(left[i..].iter().map(|&w| DiffOp::Removed(w)));
    ops.extend(right[j..].iter().map(|&w| DiffOp::Added(w)));
    ops
}

/// Unified-style rendering: changed words with up to `context` unchanged words around them.
pub fn render_diff(ops: &[DiffOp<'_>], context: usize) -> String {
    let changed: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| !matches!(op, DiffOp::Equal(_)))
        .map(|(index, _)| index)
        .collect();
    if changed.is_empty() {
        return String::new();
    }

    let near_change = |index: usize| {
        changed
            .iter()
            .any(|&c| c.abs_diff(index) <= context)
    };
    let mut out = String::new();
    let mut skipped = 0;
    for (index, op) in ops.iter().enumerate() {
        if !near_change(index) {
            skipped += 1;
            continue;
        }
        if skipped > 0 {
            out.push_str(&format!("@@ {skipped} unchanged @@\n"));
            skipped = 0;
        }
        let line = match op {
            DiffOp::Equal(word) => format!("  {word}\n"),
            DiffOp::Removed(word) => format!("- {word}\n"),
            DiffOp::Added(word) => format!("+ {word}\n"),
        };
        out.push_str(&line);
    }
    if skipped > 0 {
        out.push_str(&format!("@@ {skipped} unchanged @@\n"));
    }
    out
}
