use crate::core::error::Result;
use crate::core::object::{Blob, ObjectStore};
use crate::core::repository::Repository;
use crate::core::state::RepoState;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Change {
    Deleted,
    Modified,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Deleted => write!(f, "deleted"),
            Change::Modified => write!(f, "modified"),
        }
    }
}

/// Every section of `twig status`, each sorted by filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub current_branch: String,
    pub branches: Vec<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub unstaged: Vec<(String, Change)>,
    pub untracked: Vec<String>,
}

impl Status {
    pub fn compute(repo: &Repository, state: &RepoState) -> Result<Self> {
        let head = state.head_commit(repo.store())?;
        let index = &state.index;
        let wd = repo.workdir();
        let files = wd.files()?;

        let mut unstaged = BTreeSet::new();
        let mut untracked = Vec::new();

        for name in &files {
            let tracked = head.blob(name);
            let staged = index.staged_hash(name);

            if tracked.is_some() || staged.is_some() {
                let current = ObjectStore::digest_of(&Blob::new(wd.read(name)?))?;
                let changed = match (staged, tracked) {
                    (Some(staged), _) => *staged != current,
                    (None, Some(tracked)) => {
                        *tracked != current && !index.is_marked_for_removal(name)
                    }
                    (None, None) => false,
                };
                if changed {
                    unstaged.insert((name.clone(), Change::Modified));
                }
            }

            if (staged.is_none() && tracked.is_none()) || index.is_marked_for_removal(name) {
                untracked.push(name.clone());
            }
        }

        for name in index.staged.keys() {
            if !files.contains(name) {
                unstaged.insert((name.clone(), Change::Deleted));
            }
        }
        for name in head.blobs.keys() {
            if !index.is_marked_for_removal(name) && !files.contains(name) {
                unstaged.insert((name.clone(), Change::Deleted));
            }
        }

        Ok(Self {
            current_branch: state.branches.current_name().to_string(),
            branches: state.branches.names().cloned().collect(),
            staged: index.staged.keys().cloned().collect(),
            removed: index.removed.iter().cloned().collect(),
            unstaged: unstaged.into_iter().collect(),
            untracked,
        })
    }
}
