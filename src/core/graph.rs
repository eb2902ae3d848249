use crate::core::commit::Commit;
use crate::core::error::Result;
use crate::core::object::ObjectStore;
use std::collections::HashSet;

/// Read-only view of history through the single parent link of each commit.
///
/// Merge commits only remember the branch that was current when they were
/// made, so the split point is the first commit shared by the two parent
/// chains rather than a lowest common ancestor over the full merge graph.
pub struct CommitGraph<'a> {
    store: &'a ObjectStore,
}

impl<'a> CommitGraph<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Digests from `start` back to the root, most recent first.
    pub fn ancestor_chain(&self, start: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut next = Some(start.to_string());

        while let Some(hash) = next {
            let commit: Commit = self.store.get(&hash)?;
            chain.push(hash);
            next = commit.parent;
        }

        Ok(chain)
    }

    /// First commit of `a`'s chain that also lies on `b`'s chain.
    pub fn split_point(&self, a: &str, b: &str) -> Result<Option<String>> {
        let chain_a = self.ancestor_chain(a)?;
        let chain_b: HashSet<String> = self.ancestor_chain(b)?.into_iter().collect();

        Ok(chain_a.into_iter().find(|hash| chain_b.contains(hash)))
    }
}
