//! Nexa profile engine
//!
//! Validation and completion tracking for the specialist profile form of the
//! Nexa marketplace.
//!
//! # Structure
//!
//! - **Field validators** ([`validate`]): pure checks of one value against one
//!   [`Rule`].
//! - **Rule table** ([`rules`]): which rules apply to which field of which block.
//! - **Block validator** ([`engine`]): evaluates the table for one block and
//!   returns every [`ValidationError`].
//! - **Completion tracker** ([`completion`]): percentage and next block.
//! - **Form state container** ([`ProfileForm`]): owns one session's snapshot,
//!   completed blocks and dirty flag.
//!
//! Validation failures are data, never errors. [`Error`] is reserved for
//! caller mistakes (unknown fields, ill-typed values) and refused submissions.
//!
//! # Example
//!
//! ```
//! use nexa_profile::{BlockId, ProfileForm};
//! use serde_json::json;
//!
//! let mut form = ProfileForm::new();
//! form.update_field(BlockId::Superpower, "superpower", json!("too short"))?;
//! assert_eq!(form.validate_block(BlockId::Superpower).len(), 1);
//!
//! form.update_field(BlockId::Superpower, "superpower", json!("I train speech models"))?;
//! assert!(form.validate_block(BlockId::Superpower).is_empty());
//!
//! form.complete_block(BlockId::Superpower);
//! assert_eq!(form.completion_percentage(), 13);
//! # Ok::<(), nexa_profile::Error>(())
//! ```

pub mod block;
pub mod catalog;
pub mod collab;
pub mod completion;
pub mod engine;
pub mod error;
pub mod form;
pub mod rules;
pub mod snapshot;
pub mod validate;

pub use block::BlockId;
pub use catalog::{LabelCatalog, Skill, SpecializationLabel};
pub use collab::{
    MediaUploader, ProfileId, ProfileSubmitter, SubmissionRejection, UploadPolicy,
    UploadRejection, DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use completion::{completion_percentage, next_incomplete_block, CompletedBlocks};
pub use engine::{validate_block, validate_block_number};
pub use error::{Error, Result};
pub use form::{BlockState, ProfileForm, Progress};
pub use snapshot::{
    Contacts, ExperienceItem, FormSnapshot, PortfolioItem, ServiceItem, Specializations,
};
pub use validate::{check, FieldValue, PatternKind, Rule, ValidationError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn percentage_matches_documented_examples() {
        let all: BTreeSet<_> = BlockId::ALL.into_iter().collect();
        assert_eq!(completion_percentage(&BTreeSet::new(), 8), 0);
        assert_eq!(completion_percentage(&all, 8), 100);
    }

    #[test]
    fn validate_block_number_ignores_unknown_blocks() {
        let snapshot = FormSnapshot::new();
        for number in [0, 9, 100] {
            assert!(validate_block_number(number, &snapshot).is_empty());
        }
    }
}
