use crate::core::error::{RepoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

pub const DEFAULT_BRANCH: &str = "master";

/// The branch table and the name of the active branch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Branches {
    heads: BTreeMap<String, String>,
    current: String,
}

impl Branches {
    /// A table holding only `name`, pointing at `head`, checked out.
    pub fn new(name: &str, head: &str) -> Self {
        let mut heads = BTreeMap::new();
        heads.insert(name.to_string(), head.to_string());
        Self {
            heads,
            current: name.to_string(),
        }
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn current_head(&self) -> &str {
        self.heads
            .get(&self.current)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn head_of(&self, name: &str) -> Option<&String> {
        self.heads.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.heads.contains_key(name)
    }

    /// Branch names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.heads.keys()
    }

    /// Creates `name` at the current head.
    pub fn add_branch(&mut self, name: &str) -> Result<()> {
        if self.exists(name) {
            return Err(RepoError::BranchExists);
        }
        let head = self.current_head().to_string();
        info!(branch = name, head = %head, "created branch");
        self.heads.insert(name.to_string(), head);
        Ok(())
    }

    pub fn delete_branch(&mut self, name: &str) -> Result<()> {
        if !self.exists(name) {
            return Err(RepoError::NoSuchBranch);
        }
        if self.current == name {
            return Err(RepoError::CannotDeleteCurrent);
        }
        self.heads.remove(name);
        info!(branch = name, "deleted branch");
        Ok(())
    }

    pub fn set_current_branch(&mut self, name: &str) -> Result<()> {
        if !self.exists(name) {
            return Err(RepoError::NoSuchBranch);
        }
        self.current = name.to_string();
        Ok(())
    }

    pub fn advance_current_branch(&mut self, hash: &str) {
        info!(branch = %self.current, head = hash, "moved branch head");
        self.heads.insert(self.current.clone(), hash.to_string());
    }

    /// Checks the invariant that the active branch is in the table.
    pub fn validate(&self) -> Result<()> {
        if !self.exists(&self.current) {
            return Err(RepoError::Corrupted(format!(
                "current branch '{}' is missing from the branch table",
                self.current
            )));
        }
        Ok(())
    }
}
