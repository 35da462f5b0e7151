//! Form state container.
//!
//! Owns one form session: the snapshot being edited, the blocks the user has
//! confirmed, and whether anything changed since the last load or submit.
//!
//! Per block the lifecycle is `Untouched -> Invalid <-> Valid -> Completed`.
//! The last step is always an explicit [`ProfileForm::complete_block`] call;
//! a block that validates clean is not completed on its own.

use crate::block::BlockId;
use crate::collab::{ProfileId, ProfileSubmitter, SubmissionRejection};
use crate::completion::{self, CompletedBlocks};
use crate::engine;
use crate::error::{Error, Result};
use crate::snapshot::FormSnapshot;
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a block is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Untouched,
    Invalid,
    Valid,
    Completed,
}

/// Progress summary for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub percentage: u8,
    pub completed: Vec<BlockId>,
    pub next_block: Option<BlockId>,
    pub can_submit: bool,
    pub dirty: bool,
}

/// One profile-completion session.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    snapshot: FormSnapshot,
    completed: CompletedBlocks,
    touched: BTreeSet<BlockId>,
    dirty: bool,
    profile: Option<ProfileId>,
    server_errors: Vec<ValidationError>,
}

impl ProfileForm {
    /// Start an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn completed_blocks(&self) -> &CompletedBlocks {
        &self.completed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persisted profile this session edits or last submitted, if any.
    pub fn profile_id(&self) -> Option<&ProfileId> {
        self.profile.as_ref()
    }

    /// Errors reported by the submission collaborator on the last refusal.
    pub fn server_errors(&self) -> &[ValidationError] {
        &self.server_errors
    }

    /// Write one field. Does not validate.
    pub fn update_field(&mut self, block: BlockId, field: &str, value: serde_json::Value) -> Result<()> {
        self.snapshot.set_field(block, field, value)?;
        self.touched.insert(block);
        self.dirty = true;
        tracing::debug!(block = %block, field, "field updated");
        Ok(())
    }

    /// Validate a block against the current snapshot.
    pub fn validate_block(&self, block: BlockId) -> Vec<ValidationError> {
        engine::validate_block(block, &self.snapshot)
    }

    /// Validate by client-facing block number. Unknown numbers report nothing.
    pub fn validate_block_number(&self, number: u32) -> Vec<ValidationError> {
        engine::validate_block_number(number, &self.snapshot)
    }

    /// Mark a block as confirmed by the user. Returns false if it already was.
    pub fn complete_block(&mut self, block: BlockId) -> bool {
        let inserted = self.completed.insert(block);
        if inserted {
            tracing::info!(
                block = %block,
                percentage = self.completion_percentage(),
                "block completed"
            );
        }
        inserted
    }

    pub fn block_state(&self, block: BlockId) -> BlockState {
        if self.completed.contains(&block) {
            BlockState::Completed
        } else if !self.touched.contains(&block) {
            BlockState::Untouched
        } else if self.validate_block(block).is_empty() {
            BlockState::Valid
        } else {
            BlockState::Invalid
        }
    }

    /// Required blocks not yet completed, in canonical order.
    pub fn missing_required(&self) -> Vec<BlockId> {
        BlockId::required()
            .filter(|b| !self.completed.contains(b))
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        BlockId::required().all(|b| self.completed.contains(&b))
    }

    pub fn completion_percentage(&self) -> u8 {
        completion::completion_percentage(&self.completed, BlockId::COUNT)
    }

    pub fn next_incomplete_block(&self) -> Option<BlockId> {
        completion::next_incomplete_block(&self.completed, &BlockId::ALL)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            percentage: self.completion_percentage(),
            completed: self.completed.iter().copied().collect(),
            next_block: self.next_incomplete_block(),
            can_submit: self.can_submit(),
            dirty: self.dirty,
        }
    }

    /// Drop everything and return to the empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::debug!("form reset");
    }

    /// Start editing a persisted profile with the blocks that were confirmed
    /// when it was submitted.
    pub fn load_profile(&mut self, id: ProfileId, snapshot: FormSnapshot, completed: CompletedBlocks) {
        *self = Self {
            snapshot,
            completed,
            touched: BTreeSet::new(),
            dirty: false,
            profile: Some(id),
            server_errors: Vec::new(),
        };
        tracing::debug!(profile = ?self.profile, "profile loaded into form");
    }

    /// Hand the snapshot to the submission collaborator.
    ///
    /// Refused without calling the collaborator when required blocks are not
    /// completed or any block currently fails validation. A refusal from the
    /// collaborator is kept in [`server_errors`](Self::server_errors); the
    /// snapshot and completed blocks are left as they were.
    pub fn submit<S>(&mut self, submitter: &S) -> Result<ProfileId>
    where
        S: ProfileSubmitter + ?Sized,
    {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(Error::NotSubmittable { missing });
        }

        let errors: Vec<_> = BlockId::ALL
            .into_iter()
            .flat_map(|b| self.validate_block(b))
            .collect();
        if !errors.is_empty() {
            return Err(Error::Rejected { errors });
        }

        match submitter.submit(&self.snapshot, &self.completed, self.profile.as_ref()) {
            Ok(id) => {
                tracing::info!(profile = %id, "profile submitted");
                self.profile = Some(id.clone());
                self.server_errors.clear();
                self.dirty = false;
                Ok(id)
            }
            Err(SubmissionRejection::Invalid(errors)) => {
                tracing::warn!(errors = errors.len(), "profile refused by submission authority");
                self.server_errors = errors.clone();
                Err(Error::Rejected { errors })
            }
            Err(SubmissionRejection::Unavailable(reason)) => {
                tracing::warn!(%reason, "profile submission failed");
                Err(Error::Submission(reason))
            }
        }
    }
}
