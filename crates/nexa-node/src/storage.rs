//! Persistent storage using RocksDB.
//!
//! Storage is also the submission authority for profile forms: it re-runs the
//! block rules and rejects contact handles already owned by another profile.
//!
//! Key layout:
//! - `contact:<field>:<handle>` -> owning profile id (handles lowercased)
//! - `profile:<id>` -> JSON [`StoredProfile`]
//! - `skill:<id>` -> skill label
//! - `specialization:<key>` -> specialization label

use crate::error::Result;
use crate::record::StoredProfile;
use nexa_profile::{
    validate_block, BlockId, CompletedBlocks, FormSnapshot, LabelCatalog, ProfileId,
    ProfileSubmitter, SubmissionRejection, ValidationError,
};
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;

/// Contact fields that must be unique across profiles.
const UNIQUE_CONTACTS: [&str; 2] = ["phone", "telegram"];

/// Storage backend for node data.
pub struct Storage {
    db: DB,
}

fn contact_key(field: &str, handle: &str) -> String {
    format!("contact:{}:{}", field, handle.trim().to_ascii_lowercase())
}

/// Index keys for the unique contacts of a snapshot.
fn contact_keys(snapshot: &FormSnapshot) -> Vec<String> {
    let contacts = &snapshot.contacts;
    UNIQUE_CONTACTS
        .into_iter()
        .zip([&contacts.phone, &contacts.telegram])
        .filter_map(|(field, value)| value.as_deref().map(|v| contact_key(field, v)))
        .collect()
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // --- Profiles ---

    /// Store a profile and repoint its contact index entries.
    pub fn put_profile(&self, profile: &StoredProfile) -> Result<()> {
        let mut batch = WriteBatch::default();
        if let Some(previous) = self.get_profile(&profile.id)? {
            for key in contact_keys(&previous.snapshot) {
                batch.delete(key.as_bytes());
            }
        }
        for key in contact_keys(&profile.snapshot) {
            batch.put(key.as_bytes(), profile.id.as_bytes());
        }

        let key = format!("profile:{}", profile.id);
        batch.put(key.as_bytes(), serde_json::to_vec(profile)?);
        self.db.write(batch)?;
        Ok(())
    }

    /// Get a profile by ID.
    pub fn get_profile(&self, id: &str) -> Result<Option<StoredProfile>> {
        let key = format!("profile:{}", id);
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// List all profiles.
    pub fn list_profiles(&self) -> Result<Vec<StoredProfile>> {
        let prefix = b"profile:";
        let mut profiles = Vec::new();

        let iter = self.db.prefix_iterator(prefix);
        for item in iter {
            let (key, value) = item?;
            if key.starts_with(prefix) {
                let profile: StoredProfile = serde_json::from_slice(&value)?;
                profiles.push(profile);
            } else {
                break;
            }
        }

        Ok(profiles)
    }

    /// Profile that owns a contact handle, if any.
    pub fn contact_owner(&self, field: &str, handle: &str) -> Result<Option<String>> {
        let key = contact_key(field, handle);
        Ok(self
            .db
            .get(key.as_bytes())?
            .map(|id| String::from_utf8_lossy(&id).into_owned()))
    }

    // --- Labels ---

    /// Store a skill label.
    pub fn put_skill(&self, id: u32, label: &str) -> Result<()> {
        let key = format!("skill:{}", id);
        self.db.put(key.as_bytes(), label.as_bytes())?;
        Ok(())
    }

    /// Store a specialization label.
    pub fn put_specialization(&self, key: &str, label: &str) -> Result<()> {
        let key = format!("specialization:{}", key);
        self.db.put(key.as_bytes(), label.as_bytes())?;
        Ok(())
    }

    /// Initialize default labels if not present.
    pub fn init_default_labels(&self) -> Result<()> {
        let defaults = LabelCatalog::defaults();
        for skill in defaults.skills() {
            let key = format!("skill:{}", skill.id);
            if self.db.get(key.as_bytes())?.is_none() {
                self.put_skill(skill.id, &skill.label)?;
            }
        }
        for specialization in defaults.specializations() {
            let key = format!("specialization:{}", specialization.key);
            if self.db.get(key.as_bytes())?.is_none() {
                self.put_specialization(&specialization.key, &specialization.label)?;
            }
        }
        Ok(())
    }

    /// Load every stored label.
    pub fn load_catalog(&self) -> Result<LabelCatalog> {
        let mut catalog = LabelCatalog::new();

        for (key, label) in self.scan(b"skill:")? {
            let Ok(id) = key.parse::<u32>() else {
                tracing::warn!(key = %key, "skipping malformed skill key");
                continue;
            };
            catalog = catalog.with_skill(id, label);
        }
        for (key, label) in self.scan(b"specialization:")? {
            catalog = catalog.with_specialization(key, label);
        }

        Ok(catalog)
    }

    /// Key suffixes and UTF-8 values under `prefix`.
    fn scan(&self, prefix: &[u8]) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((
                String::from_utf8_lossy(&key[prefix.len()..]).into_owned(),
                String::from_utf8_lossy(&value).into_owned(),
            ));
        }
        Ok(entries)
    }

    // --- Submission authority ---

    /// Server-side checks for a submitted snapshot.
    fn review(&self, snapshot: &FormSnapshot, existing: Option<&ProfileId>) -> Result<Vec<ValidationError>> {
        let mut errors: Vec<_> = BlockId::ALL
            .into_iter()
            .flat_map(|b| validate_block(b, snapshot))
            .collect();

        let contacts = &snapshot.contacts;
        for (field, value) in UNIQUE_CONTACTS.into_iter().zip([&contacts.phone, &contacts.telegram]) {
            let Some(value) = value else { continue };
            let Some(owner) = self.contact_owner(field, value)? else { continue };
            if existing.map_or(true, |id| owner != id.0) {
                errors.push(ValidationError::new(field, "Already used by another profile"));
            }
        }

        Ok(errors)
    }
}

impl ProfileSubmitter for Storage {
    fn submit(
        &self,
        snapshot: &FormSnapshot,
        completed: &CompletedBlocks,
        existing: Option<&ProfileId>,
    ) -> std::result::Result<ProfileId, SubmissionRejection> {
        let unavailable = |e: crate::error::Error| SubmissionRejection::Unavailable(e.to_string());

        let errors = self.review(snapshot, existing).map_err(unavailable)?;
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "submission refused on review");
            return Err(SubmissionRejection::Invalid(errors));
        }

        let profile = match existing {
            Some(id) => match self.get_profile(&id.0).map_err(unavailable)? {
                Some(previous) => previous.revise(snapshot.clone(), completed.clone()),
                None => {
                    return Err(SubmissionRejection::Unavailable(format!(
                        "profile {id} no longer exists"
                    )))
                }
            },
            None => StoredProfile::new(snapshot.clone(), completed.clone()),
        };

        self.put_profile(&profile).map_err(unavailable)?;
        tracing::info!(profile = %profile.id, revision = profile.revision, "profile stored");
        Ok(profile.profile_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn complete_snapshot(phone: &str) -> FormSnapshot {
        let mut s = FormSnapshot::new();
        s.specializations.neural_images = true;
        s.superpower = "Stable diffusion pipelines for retail".to_string();
        s.abilities = vec![6];
        s.contacts.phone = Some(phone.to_string());
        s
    }

    fn confirmed() -> CompletedBlocks {
        BlockId::required().collect()
    }

    #[test]
    fn storage_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let profile = StoredProfile::new(complete_snapshot("+1 555 010 0001"), confirmed());
        storage.put_profile(&profile).unwrap();
        let loaded = storage.get_profile(&profile.id).unwrap().unwrap();
        assert_eq!(profile, loaded);
        assert_eq!(loaded.completed, confirmed());

        assert!(storage.get_profile("missing").unwrap().is_none());
    }

    #[test]
    fn list_profiles() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage
            .put_profile(&StoredProfile::new(complete_snapshot("+1 555 010 0001"), confirmed()))
            .unwrap();
        storage
            .put_profile(&StoredProfile::new(complete_snapshot("+1 555 010 0002"), confirmed()))
            .unwrap();
        storage.put_skill(1, "Prompt engineering").unwrap();

        // Contact index entries sort before profiles and are not listed.
        assert_eq!(storage.list_profiles().unwrap().len(), 2);
    }

    #[test]
    fn default_labels() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage.put_skill(1, "Prompting").unwrap();
        storage.put_specialization("consulting", "Advisory").unwrap();
        storage.init_default_labels().unwrap();

        let catalog = storage.load_catalog().unwrap();
        assert_eq!(catalog.len(), LabelCatalog::defaults().len());
        // Existing labels are kept.
        assert_eq!(catalog.label(1), Some("Prompting"));
        assert_eq!(catalog.label(10), Some("Model evaluation"));
        assert_eq!(catalog.specialization_label("consulting"), Some("Advisory"));
        assert_eq!(catalog.specialization_label("neural_video"), Some("Video generation"));
        assert_eq!(
            catalog.specializations().len(),
            LabelCatalog::defaults().specializations().len()
        );
    }

    #[test]
    fn contact_index_follows_revisions() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let mut snapshot = complete_snapshot("+1 555 010 0001");
        snapshot.contacts.telegram = Some("@Neural_Dev".to_string());
        let profile = StoredProfile::new(snapshot, confirmed());
        storage.put_profile(&profile).unwrap();

        let owner = Some(profile.id.clone());
        assert_eq!(storage.contact_owner("phone", "+1 555 010 0001").unwrap(), owner);
        assert_eq!(storage.contact_owner("telegram", "@neural_dev").unwrap(), owner);

        let revised = profile.revise(complete_snapshot("+1 555 010 0009"), confirmed());
        storage.put_profile(&revised).unwrap();

        assert_eq!(storage.contact_owner("phone", "+1 555 010 0001").unwrap(), None);
        assert_eq!(storage.contact_owner("telegram", "@neural_dev").unwrap(), None);
        assert_eq!(storage.contact_owner("phone", "+1 555 010 0009").unwrap(), owner);
    }

    #[test]
    fn submit_creates_then_revises() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let id = storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), None)
            .unwrap();
        let again = storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), Some(&id))
            .unwrap();
        assert_eq!(id, again);

        let stored = storage.get_profile(&id.0).unwrap().unwrap();
        assert_eq!(stored.revision, 2);
        assert_eq!(stored.completed, confirmed());
        assert_eq!(storage.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn submit_rejects_taken_phone() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), None)
            .unwrap();
        let err = storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), None)
            .unwrap_err();

        match err {
            SubmissionRejection::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field_id, "phone");
            }
            other => panic!("unexpected rejection: {other}"),
        }
    }

    #[test]
    fn released_handle_can_be_claimed() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let first = storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), None)
            .unwrap();
        storage
            .submit(&complete_snapshot("+1 555 010 0002"), &confirmed(), Some(&first))
            .unwrap();

        assert!(storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), None)
            .is_ok());
    }

    #[test]
    fn submit_rejects_invalid_content() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let err = storage
            .submit(&FormSnapshot::new(), &CompletedBlocks::new(), None)
            .unwrap_err();
        assert!(matches!(err, SubmissionRejection::Invalid(ref errors) if errors.len() == 4));
        assert!(storage.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn submit_unknown_existing_profile() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let missing = ProfileId("gone".to_string());
        let err = storage
            .submit(&complete_snapshot("+1 555 010 0001"), &confirmed(), Some(&missing))
            .unwrap_err();
        assert!(matches!(err, SubmissionRejection::Unavailable(_)));
    }
}
