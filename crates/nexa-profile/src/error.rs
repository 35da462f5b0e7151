//! Error types for nexa-profile.
//!
//! Field validation failures are not errors: they are returned as
//! [`ValidationError`](crate::ValidationError) values. The variants here cover
//! caller mistakes and refused submissions.

use crate::block::BlockId;
use crate::validate::ValidationError;
use thiserror::Error;

/// Result type for nexa-profile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the form state container.
#[derive(Debug, Error)]
pub enum Error {
    /// The block has no field with this name.
    #[error("unknown field `{field}` in block {block}")]
    UnknownField { block: BlockId, field: String },

    /// The value does not fit the field's type.
    #[error("invalid value for `{field}` in block {block}: {reason}")]
    InvalidValue {
        block: BlockId,
        field: String,
        reason: String,
    },

    /// Required blocks are still missing from the completed set.
    #[error("profile cannot be submitted, incomplete blocks: {missing:?}")]
    NotSubmittable { missing: Vec<BlockId> },

    /// Local or server-side validation refused the submission.
    #[error("submission rejected with {} error(s)", errors.len())]
    Rejected { errors: Vec<ValidationError> },

    /// The submission collaborator failed for a non-validation reason.
    #[error("submission failed: {0}")]
    Submission(String),
}
