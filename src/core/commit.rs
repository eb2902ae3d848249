use crate::core::error::{RepoError, Result};
use crate::core::object::{Object, ObjectType};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// A snapshot of every tracked file plus a single parent link.
///
/// `blobs` maps filename to blob digest and is always the complete set of
/// tracked files, never a delta against the parent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub parent: Option<String>,
    pub blobs: BTreeMap<String, String>,
}

impl Commit {
    pub fn new(
        message: String,
        timestamp: DateTime<Utc>,
        parent: Option<String>,
        blobs: BTreeMap<String, String>,
    ) -> Self {
        Self {
            message,
            timestamp,
            parent,
            blobs,
        }
    }

    /// The commit every repository starts from. It is identical across
    /// repositories, so its digest is too.
    pub fn root() -> Self {
        let epoch = Utc.timestamp_opt(0, 0).single().unwrap_or_default();
        Self::new(
            INITIAL_COMMIT_MESSAGE.to_string(),
            epoch,
            None,
            BTreeMap::new(),
        )
    }

    pub fn is_tracking(&self, file_name: &str) -> bool {
        self.blobs.contains_key(file_name)
    }

    pub fn blob(&self, file_name: &str) -> Option<&String> {
        self.blobs.get(file_name)
    }

    pub fn format_for_log(&self, hash: &str) -> String {
        let date = self
            .timestamp
            .with_timezone(&Local)
            .format("%a %b %-d %H:%M:%S %Y %z");
        format!("===\ncommit {}\nDate: {}\n{}\n", hash, date, self.message)
    }
}

impl Object for Commit {
    const TYPE: ObjectType = ObjectType::Commit;

    fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| RepoError::Corrupted(format!("unreadable commit: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ObjectStore;

    fn sample() -> Commit {
        let mut blobs = BTreeMap::new();
        blobs.insert("b.txt".to_string(), "2".repeat(64));
        blobs.insert("a.txt".to_string(), "1".repeat(64));
        Commit::new(
            "first".to_string(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            Some("f".repeat(64)),
            blobs,
        )
    }

    #[test]
    fn root_commit_is_reproducible() {
        let a = ObjectStore::digest_of(&Commit::root()).unwrap();
        let b = ObjectStore::digest_of(&Commit::root()).unwrap();
        assert_eq!(a, b);
        assert!(Commit::root().parent.is_none());
        assert_eq!(Commit::root().message, INITIAL_COMMIT_MESSAGE);
    }

    #[test]
    fn equal_fields_give_equal_digests() {
        assert_eq!(
            ObjectStore::digest_of(&sample()).unwrap(),
            ObjectStore::digest_of(&sample()).unwrap()
        );

        let mut changed = sample();
        changed.message = "second".to_string();
        assert_ne!(
            ObjectStore::digest_of(&sample()).unwrap(),
            ObjectStore::digest_of(&changed).unwrap()
        );
    }

    #[test]
    fn payload_round_trip() {
        let commit = sample();
        let payload = commit.to_payload().unwrap();
        assert_eq!(Commit::from_payload(&payload).unwrap(), commit);
    }

    #[test]
    fn blob_map_keys_are_ordered_in_payload() {
        let payload = String::from_utf8(sample().to_payload().unwrap()).unwrap();
        let a = payload.find("a.txt").unwrap();
        let b = payload.find("b.txt").unwrap();
        assert!(a < b);
    }

    #[test]
    fn garbage_payload_is_corrupted() {
        assert!(matches!(
            Commit::from_payload(b"{not json"),
            Err(RepoError::Corrupted(_))
        ));
    }

    #[test]
    fn log_entry_layout() {
        let entry = sample().format_for_log("abc");
        assert!(entry.starts_with("===\ncommit abc\nDate: "));
        assert!(entry.ends_with("\nfirst\n"));
    }
}
