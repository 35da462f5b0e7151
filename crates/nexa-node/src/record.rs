//! Persisted profile record.

use nexa_profile::{CompletedBlocks, FormSnapshot, ProfileId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A submitted specialist profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredProfile {
    /// Unique identifier (Blake3 hash of first submission)
    pub id: String,

    /// Profile content as submitted
    pub snapshot: FormSnapshot,

    /// Blocks the specialist confirmed before submitting
    #[serde(default)]
    pub completed: CompletedBlocks,

    /// Number of accepted submissions, starting at 1
    pub revision: u32,

    /// Unix seconds of the first submission
    pub created_at: u64,

    /// Unix seconds of the latest submission
    pub updated_at: u64,

    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

fn default_schema_version() -> String {
    "1.0.0".to_string()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl StoredProfile {
    /// Create the first revision of a profile.
    pub fn new(snapshot: FormSnapshot, completed: CompletedBlocks) -> Self {
        let now = now_secs();
        let seed = format!(
            "{}:{}:{}",
            serde_json::to_string(&snapshot).unwrap_or_default(),
            now,
            rand::random::<u64>()
        );
        Self {
            id: Self::generate_id(seed.as_bytes()),
            snapshot,
            completed,
            revision: 1,
            created_at: now,
            updated_at: now,
            schema_version: default_schema_version(),
        }
    }

    /// Next revision with new content, keeping the identity.
    pub fn revise(mut self, snapshot: FormSnapshot, completed: CompletedBlocks) -> Self {
        self.snapshot = snapshot;
        self.completed = completed;
        self.revision += 1;
        self.updated_at = now_secs();
        self
    }

    /// Generate ID from content hash.
    pub fn generate_id(content: &[u8]) -> String {
        let hash = blake3::hash(content);
        hex::encode(hash.as_bytes())
    }

    pub fn profile_id(&self) -> ProfileId {
        ProfileId(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexa_profile::BlockId;

    #[test]
    fn new_profile() {
        let profile = StoredProfile::new(FormSnapshot::new(), CompletedBlocks::new());
        assert_eq!(profile.revision, 1);
        assert_eq!(profile.id.len(), 64);
        assert_eq!(profile.created_at, profile.updated_at);
        assert_eq!(profile.schema_version, "1.0.0");
    }

    #[test]
    fn ids_are_unique_per_submission() {
        let a = StoredProfile::new(FormSnapshot::new(), CompletedBlocks::new());
        let b = StoredProfile::new(FormSnapshot::new(), CompletedBlocks::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn revise_keeps_identity() {
        let profile = StoredProfile::new(FormSnapshot::new(), CompletedBlocks::new());
        let id = profile.id.clone();

        let mut snapshot = FormSnapshot::new();
        snapshot.superpower = "Voice cloning for audiobooks".to_string();
        let completed: CompletedBlocks = [BlockId::Superpower].into_iter().collect();
        let revised = profile.revise(snapshot.clone(), completed.clone());

        assert_eq!(revised.id, id);
        assert_eq!(revised.revision, 2);
        assert_eq!(revised.snapshot, snapshot);
        assert_eq!(revised.completed, completed);
    }

    #[test]
    fn records_without_completed_blocks_still_load() {
        let profile = StoredProfile::new(FormSnapshot::new(), BlockId::required().collect());
        let mut json = serde_json::to_value(&profile).unwrap();
        json.as_object_mut().unwrap().remove("completed");

        let parsed: StoredProfile = serde_json::from_value(json).unwrap();
        assert!(parsed.completed.is_empty());
    }

    #[test]
    fn generate_id_deterministic() {
        let id1 = StoredProfile::generate_id(b"test content");
        let id2 = StoredProfile::generate_id(b"test content");
        assert_eq!(id1, id2);
    }

    #[test]
    fn serialize_deserialize() {
        let profile = StoredProfile::new(FormSnapshot::new(), BlockId::required().collect());
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: StoredProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, parsed);
    }
}
