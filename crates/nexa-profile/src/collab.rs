//! Contracts for the collaborators around the form: profile submission and
//! media upload.

use crate::completion::CompletedBlocks;
use crate::snapshot::FormSnapshot;
use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionRejection {
    /// The authority disagreed with the profile content.
    #[error("profile refused with {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    /// The submission could not be carried out.
    #[error("submission unavailable: {0}")]
    Unavailable(String),
}

/// Accepts a validated snapshot and persists it.
pub trait ProfileSubmitter {
    /// Persist the snapshot together with the blocks the user confirmed.
    /// `existing` is set when an already stored profile is being edited.
    fn submit(
        &self,
        snapshot: &FormSnapshot,
        completed: &CompletedBlocks,
        existing: Option<&ProfileId>,
    ) -> Result<ProfileId, SubmissionRejection>;
}

/// Default upload size limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted for portfolio and testimonial media.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Why an upload was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("file type {0} is not allowed")]
    UnsupportedType(String),

    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is empty")]
    Empty,

    #[error("upload failed: {0}")]
    Failed(String),
}

/// Type and size constraints for uploaded media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Builder: set the size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Check a file's declared MIME type and size.
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), UploadRejection> {
        let mime = mime_type.trim().to_ascii_lowercase();
        if !self.allowed_mime_types.iter().any(|m| *m == mime) {
            return Err(UploadRejection::UnsupportedType(mime));
        }
        if size == 0 {
            return Err(UploadRejection::Empty);
        }
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Stores uploaded media and returns its public URL.
pub trait MediaUploader {
    fn policy(&self) -> &UploadPolicy;

    /// Store bytes that already passed [`UploadPolicy::check`].
    fn store(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<String, UploadRejection>;

    /// Check the policy, then store.
    fn upload(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<String, UploadRejection> {
        self.policy().check(mime_type, bytes.len() as u64)?;
        self.store(file_name, mime_type, bytes)
    }
}
