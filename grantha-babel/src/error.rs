//! Error types for grantha operations

use thiserror::Error;

/// Errors raised while parsing, querying or writing a grantha.
///
/// Every failure is a document error: callers treat it as fatal for the document at hand.
/// Content mismatches found by the chunk validator are not errors, see
/// [`crate::validator::ChunkStatus`].
#[derive(Debug, Error)]
pub enum GranthaError {
    /// A reference does not decompose into the expected segments
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    /// No passage exists for the requested reference
    #[error("Passage '{0}' not found")]
    PassageNotFound(String),
    /// The passage exists but has no text in the requested script
    #[error("Script '{script}' not available for '{reference}'")]
    ScriptNotAvailable { reference: String, script: String },
    /// The commentary id is not present in the grantha
    #[error("Commentary '{0}' not found")]
    CommentaryNotFound(String),
    /// Malformed frontmatter or a cross-reference integrity failure
    #[error("Validation error: {0}")]
    Validation(String),
    /// Error while producing or reading serialized output
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GranthaError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        GranthaError::Validation(msg.into())
    }

    pub(crate) fn script_not_available(reference: &str, script: &str) -> Self {
        GranthaError::ScriptNotAvailable {
            reference: reference.to_string(),
            script: script.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GranthaError>;
