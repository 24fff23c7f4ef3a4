//! Error Types
//!
//! Contract violations abort a reconciliation pass. Malformed payload fields
//! never surface here; the offending operation is skipped instead.

use thiserror::Error;

use crate::models::ActionIntent;

/// Errors raised while reconciling in-flight operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The response belongs to a different intent than the submission
    #[error("action result mismatch: submitted {submitted}, response for {responded}")]
    IntentMismatch {
        submitted: ActionIntent,
        responded: ActionIntent,
    },

    #[error("carried new ids are empty")]
    EmptyNewIds,

    #[error("not a new todo id: {0}")]
    NotANewId(String),

    /// The temporary id sequence has no suffix left to hand out
    #[error("temporary todo ids exhausted")]
    NewIdsExhausted,
}

/// Errors raised while turning transport data into typed operations
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("form data has no intent")]
    MissingIntent,

    #[error("unsupported intent: {0}")]
    UnsupportedIntent(String),

    #[error("invalid action result: {0}")]
    InvalidResult(#[from] serde_json::Error),
}
