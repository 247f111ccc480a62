//! Merges the two independent sources of commentary data.
//!
//! Frontmatter declares `commentaries_metadata`: display metadata (title, commentator
//! names) keyed by commentary id. The body attaches commentary text to passages through
//! inline directives, also keyed by commentary id. Precedence is fixed:
//!
//! - frontmatter owns display metadata; inline directives never supply titles or names
//! - inline directives own content; frontmatter never supplies passages
//!
//! An id present only inline yields a commentary with empty metadata. An id present only
//! in frontmatter yields a commentary with no passages. Neither case is an error.

use crate::model::{Commentary, CommentaryMetadata, CommentaryPassage};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the commentaries mapping from declared metadata and inline attachments.
///
/// `attachments` must be in document order; each commentary's passages keep that order.
pub fn merge_commentaries(
    declared: BTreeMap<String, CommentaryMetadata>,
    attachments: Vec<(String, CommentaryPassage)>,
) -> BTreeMap<String, Commentary> {
    let mut merged: BTreeMap<String, Commentary> = declared
        .into_iter()
        .map(|(id, metadata)| {
            let commentary = Commentary {
                commentary_id: id.clone(),
                commentary_title: metadata.commentary_title,
                commentator: metadata.commentator,
                passages: Vec::new(),
            };
            (id, commentary)
        })
        .collect();

    for (id, entry) in attachments {
        merged
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(commentary_id = %id, "commentary has no frontmatter metadata");
                Commentary::new(id.clone())
            })
            .passages
            .push(entry);
    }

    merged
}
