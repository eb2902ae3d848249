use crate::core::branch::Branches;
use crate::core::commit::Commit;
use crate::core::error::{RepoError, Result};
use crate::core::index::Index;
use crate::core::object::{Blob, ObjectStore};
use crate::core::workdir::WorkingDir;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const STATE_VERSION: u32 = 1;

/// Everything about a repository that is not history: branches, the
/// staging area, pending removals and the index of every commit made.
///
/// Loaded once per command and written back once at the end.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RepoState {
    pub version: u32,
    pub branches: Branches,
    pub index: Index,
    pub commits: Vec<String>,
}

impl RepoState {
    pub fn new(branches: Branches, root: String) -> Self {
        Self {
            version: STATE_VERSION,
            branches,
            index: Index::new(),
            commits: vec![root],
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let state: RepoState = serde_json::from_str(&content)
            .map_err(|e| RepoError::Corrupted(format!("unreadable state: {}", e)))?;
        state.verify_integrity()?;
        Ok(state)
    }

    /// Writes through a temporary file so a crash never leaves a torn state.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn verify_integrity(&self) -> Result<()> {
        if self.version != STATE_VERSION {
            return Err(RepoError::Corrupted(format!(
                "unsupported state version {}",
                self.version
            )));
        }
        self.branches.validate()?;

        if let Some(path) = self.index.staged.keys().find(|p| self.index.removed.contains(*p)) {
            return Err(RepoError::Corrupted(format!(
                "{} is both staged and marked for removal",
                path
            )));
        }
        Ok(())
    }

    pub fn head_commit(&self, store: &ObjectStore) -> Result<Commit> {
        store.get(self.branches.current_head())
    }

    pub fn commit_exists(&self, hash: &str) -> bool {
        self.commits.iter().any(|c| c == hash)
    }

    /// Expands an abbreviated commit id to the one full digest it prefixes.
    pub fn resolve_commit(&self, prefix: &str) -> Result<String> {
        let prefix = prefix.to_lowercase();
        let mut matches = self.commits.iter().filter(|c| c.starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(hash), None) if !prefix.is_empty() => Ok(hash.clone()),
            _ => Err(RepoError::AmbiguousOrUnknownPrefix(prefix)),
        }
    }

    /// Records the staged changes as a new commit on the current branch.
    pub fn commit(&mut self, store: &ObjectStore, message: &str) -> Result<String> {
        if self.index.is_empty() {
            return Err(RepoError::NothingToCommit);
        }
        if message.is_empty() {
            return Err(RepoError::EmptyMessage);
        }
        self.record_commit(store, message)
    }

    /// Builds the next snapshot from the head's blob map and the index,
    /// whether or not anything is staged.
    pub(crate) fn record_commit(&mut self, store: &ObjectStore, message: &str) -> Result<String> {
        let parent_hash = self.branches.current_head().to_string();
        let parent = self.head_commit(store)?;

        let mut blobs = parent.blobs;
        for (path, hash) in &self.index.staged {
            blobs.insert(path.clone(), hash.clone());
        }
        for path in &self.index.removed {
            blobs.remove(path);
        }

        let commit = Commit::new(message.to_string(), Utc::now(), Some(parent_hash), blobs);
        let hash = store.put(&commit)?;

        self.index.clear();
        self.branches.advance_current_branch(&hash);
        if !self.commit_exists(&hash) {
            self.commits.push(hash.clone());
        }

        info!(commit = %hash, files = commit.blobs.len(), "created commit");
        Ok(hash)
    }

    /// Stages the working copy of `name`, or drops it from the index if it
    /// matches what the head already tracks.
    pub fn add_file(&mut self, store: &ObjectStore, workdir: &WorkingDir, name: &str) -> Result<()> {
        if !WorkingDir::is_trackable(name) {
            return Err(RepoError::FileNotFound);
        }
        let contents = workdir
            .read_if_exists(name)?
            .ok_or(RepoError::FileNotFound)?;
        let head = self.head_commit(store)?;
        let blob = Blob::new(contents);
        let hash = ObjectStore::digest_of(&blob)?;

        if head.blob(name) == Some(&hash) {
            debug!(file = name, "matches head, nothing to stage");
            self.index.unstage(name);
            self.index.cancel_removal(name);
            return Ok(());
        }

        store.put(&blob)?;
        self.index.stage(name, &hash);
        debug!(file = name, blob = %hash, "staged file");
        Ok(())
    }

    /// Unstages `name` and, if the head tracks it, queues it for removal and
    /// deletes the working copy.
    pub fn remove_file(&mut self, store: &ObjectStore, workdir: &WorkingDir, name: &str) -> Result<()> {
        let head = self.head_commit(store)?;
        let tracked = head.is_tracking(name);

        if !self.index.is_staged(name) && !tracked {
            return Err(RepoError::NothingToRemove);
        }

        self.index.unstage(name);
        if tracked {
            self.index.mark_for_removal(name);
            workdir.remove(name)?;
            debug!(file = name, "marked for removal");
        }
        Ok(())
    }

    /// Digests of every commit whose message is exactly `message`.
    pub fn find_by_message(&self, store: &ObjectStore, message: &str) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for hash in &self.commits {
            let commit: Commit = store.get(hash)?;
            if commit.message == message {
                found.push(hash.clone());
            }
        }
        if found.is_empty() {
            return Err(RepoError::NoMatchingCommit);
        }
        Ok(found)
    }
}
