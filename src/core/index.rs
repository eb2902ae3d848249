use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Changes queued for the next commit.
///
/// A filename is never both staged and marked for removal.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct Index {
    pub staged: BTreeMap<String, String>,
    pub removed: BTreeSet<String>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `hash` as the next content of `path`, cancelling any pending
    /// removal of it.
    pub fn stage(&mut self, path: &str, hash: &str) {
        self.removed.remove(path);
        self.staged.insert(path.to_string(), hash.to_string());
    }

    pub fn unstage(&mut self, path: &str) -> Option<String> {
        self.staged.remove(path)
    }

    pub fn mark_for_removal(&mut self, path: &str) {
        self.staged.remove(path);
        self.removed.insert(path.to_string());
    }

    pub fn cancel_removal(&mut self, path: &str) -> bool {
        self.removed.remove(path)
    }

    pub fn is_staged(&self, path: &str) -> bool {
        self.staged.contains_key(path)
    }

    pub fn is_marked_for_removal(&self, path: &str) -> bool {
        self.removed.contains(path)
    }

    pub fn staged_hash(&self, path: &str) -> Option<&String> {
        self.staged.get(path)
    }

    pub fn clear(&mut self) {
        self.staged.clear();
        self.removed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn staging_cancels_removal() {
        let mut index = Index::new();
        index.mark_for_removal("f");
        assert!(index.is_marked_for_removal("f"));

        index.stage("f", "abc");
        assert!(index.is_staged("f"));
        assert!(!index.is_marked_for_removal("f"));
    }

    #[test]
    fn removal_unstages() {
        let mut index = Index::new();
        index.stage("f", "abc");
        index.mark_for_removal("f");
        assert!(!index.is_staged("f"));
        assert!(index.is_marked_for_removal("f"));
    }

    #[test]
    fn unstage_leaves_removals_alone() {
        let mut index = Index::new();
        index.stage("a", "1");
        index.mark_for_removal("b");
        assert_eq!(index.unstage("a"), Some("1".to_string()));
        assert!(index.is_marked_for_removal("b"));
        assert!(!index.is_empty());

        index.clear();
        assert!(index.is_empty());
    }

    proptest! {
        #[test]
        fn staging_twice_equals_staging_once(path in "[a-z]{1,8}", hash in "[0-9a-f]{64}") {
            let mut once = Index::new();
            once.stage(&path, &hash);
            let mut twice = Index::new();
            twice.stage(&path, &hash);
            twice.stage(&path, &hash);
            prop_assert_eq!(once, twice);
        }
    }
}
