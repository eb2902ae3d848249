use crate::core::checkout::{check_untracked, materialize};
use crate::core::commit::Commit;
use crate::core::error::{RepoError, Result};
use crate::core::graph::CommitGraph;
use crate::core::object::Blob;
use crate::core::repository::Repository;
use crate::core::state::RepoState;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The given branch head is already in the current branch's history.
    AlreadyAncestor,
    /// The current branch was moved forward to the given head.
    FastForward { head: String },
    /// A merge commit was made; `conflicts` lists files written with markers.
    Merged {
        commit: String,
        conflicts: Vec<String>,
    },
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty())
    }
}

/// What a merge does to one file. Files absent from the plan keep the
/// current branch's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Check out and stage the given branch's blob.
    TakeGiven(String),
    /// Untrack and delete the file.
    Delete,
    /// Write both versions between conflict markers.
    Conflict,
}

/// Decides the fate of every file touched by either side since `split`.
pub fn classify(split: &Commit, current: &Commit, given: &Commit) -> BTreeMap<String, FileAction> {
    let names: BTreeSet<&String> = split
        .blobs
        .keys()
        .chain(current.blobs.keys())
        .chain(given.blobs.keys())
        .collect();

    let mut plan = BTreeMap::new();
    for name in names {
        let s = split.blob(name);
        let c = current.blob(name);
        let g = given.blob(name);

        let action = if c == g || s == g {
            None
        } else if s == c {
            match g {
                Some(hash) => Some(FileAction::TakeGiven(hash.clone())),
                None => Some(FileAction::Delete),
            }
        } else {
            Some(FileAction::Conflict)
        };

        if let Some(action) = action {
            plan.insert(name.clone(), action);
        }
    }
    plan
}

/// Body of a conflicted file. Each side ends with a newline unless it is
/// empty.
pub fn conflict_contents(current: Option<&[u8]>, given: Option<&[u8]>) -> Vec<u8> {
    let mut out = b"<<<<<<< HEAD\n".to_vec();
    push_side(&mut out, current.unwrap_or_default());
    out.extend_from_slice(b"=======\n");
    push_side(&mut out, given.unwrap_or_default());
    out.extend_from_slice(b">>>>>>>\n");
    out
}

fn push_side(out: &mut Vec<u8>, side: &[u8]) {
    out.extend_from_slice(side);
    if !side.is_empty() && !side.ends_with(b"\n") {
        out.push(b'\n');
    }
}

/// Merges branch `branch_name` into the current branch.
pub fn merge(repo: &Repository, state: &mut RepoState, branch_name: &str) -> Result<MergeOutcome> {
    if !state.index.is_empty() {
        return Err(RepoError::UncommittedChanges);
    }
    let given_hash = state
        .branches
        .head_of(branch_name)
        .cloned()
        .ok_or(RepoError::NoSuchBranch)?;
    if state.branches.current_name() == branch_name {
        return Err(RepoError::SelfMerge);
    }

    let store = repo.store();
    let given: Commit = store.get(&given_hash)?;
    check_untracked(repo, state, &given)?;

    let current_hash = state.branches.current_head().to_string();
    let split_hash = CommitGraph::new(store)
        .split_point(&current_hash, &given_hash)?
        .ok_or_else(|| RepoError::Corrupted("branches share no history".to_string()))?;
    debug!(split = %split_hash, current = %current_hash, given = %given_hash, "found split point");

    if split_hash == given_hash {
        return Ok(MergeOutcome::AlreadyAncestor);
    }
    if split_hash == current_hash {
        materialize(repo, state, &given_hash)?;
        state.branches.advance_current_branch(&given_hash);
        state.index.clear();
        info!(branch = branch_name, head = %given_hash, "fast-forwarded");
        return Ok(MergeOutcome::FastForward { head: given_hash });
    }

    let split: Commit = store.get(&split_hash)?;
    let current = state.head_commit(store)?;
    let plan = classify(&split, &current, &given);

    let mut conflicts = Vec::new();
    for (name, action) in &plan {
        match action {
            FileAction::TakeGiven(blob_hash) => {
                let blob: Blob = store.get(blob_hash)?;
                repo.workdir().write(name, blob.contents())?;
                state.index.stage(name, blob_hash);
            }
            FileAction::Delete => {
                state.index.mark_for_removal(name);
                repo.workdir().remove(name)?;
            }
            FileAction::Conflict => {
                let ours = read_side(repo, current.blob(name))?;
                let theirs = read_side(repo, given.blob(name))?;
                let blob = Blob::new(conflict_contents(ours.as_deref(), theirs.as_deref()));
                repo.workdir().write(name, blob.contents())?;
                let blob_hash = store.put(&blob)?;
                state.index.stage(name, &blob_hash);
                conflicts.push(name.clone());
            }
        }
    }

    let message = format!(
        "Merged {} into {}.",
        branch_name,
        state.branches.current_name()
    );
    let commit = state.record_commit(store, &message)?;

    if conflicts.is_empty() {
        info!(commit = %commit, branch = branch_name, "merged");
    } else {
        warn!(commit = %commit, files = ?conflicts, "merged with conflicts");
    }
    Ok(MergeOutcome::Merged { commit, conflicts })
}

fn read_side(repo: &Repository, blob_hash: Option<&String>) -> Result<Option<Vec<u8>>> {
    match blob_hash {
        Some(hash) => {
            let blob: Blob = repo.store().get(hash)?;
            Ok(Some(blob.into_contents()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn snapshot(files: &[(&str, &str)]) -> Commit {
        let blobs = files
            .iter()
            .map(|(n, h)| (n.to_string(), h.to_string()))
            .collect();
        Commit::new("snap".to_string(), Utc::now(), None, blobs)
    }

    #[test]
    fn classification_rules() {
        let split = snapshot(&[
            ("same", "1"),
            ("given-changed", "1"),
            ("current-changed", "1"),
            ("both-same", "1"),
            ("both-differ", "1"),
            ("given-deleted", "1"),
            ("current-deleted", "1"),
            ("deleted-changed", "1"),
        ]);
        let current = snapshot(&[
            ("same", "1"),
            ("given-changed", "1"),
            ("current-changed", "2"),
            ("both-same", "2"),
            ("both-differ", "2"),
            ("given-deleted", "1"),
            ("deleted-changed", "1"),
            ("current-added", "9"),
        ]);
        let given = snapshot(&[
            ("same", "1"),
            ("given-changed", "2"),
            ("current-changed", "1"),
            ("both-same", "2"),
            ("both-differ", "3"),
            ("current-deleted", "1"),
            ("deleted-changed", "1"),
            ("given-added", "7"),
        ]);

        let plan = classify(&split, &current, &given);
        let expected: BTreeMap<String, FileAction> = [
            ("given-changed", FileAction::TakeGiven("2".to_string())),
            ("given-added", FileAction::TakeGiven("7".to_string())),
            ("given-deleted", FileAction::Delete),
            ("both-differ", FileAction::Conflict),
        ]
        .into_iter()
        .map(|(n, a)| (n.to_string(), a))
        .collect();
        assert_eq!(plan, expected);
    }

    #[test]
    fn deletion_against_modification_conflicts() {
        let split = snapshot(&[("a", "1"), ("b", "1")]);
        let current = snapshot(&[("a", "2")]);
        let given = snapshot(&[("b", "2")]);
        let plan = classify(&split, &current, &given);
        assert_eq!(plan.get("a"), Some(&FileAction::Conflict));
        assert_eq!(plan.get("b"), Some(&FileAction::Conflict));
    }

    #[test]
    fn added_differently_on_both_sides_conflicts() {
        let split = snapshot(&[]);
        let current = snapshot(&[("new", "1")]);
        let given = snapshot(&[("new", "2")]);
        assert_eq!(
            classify(&split, &current, &given).get("new"),
            Some(&FileAction::Conflict)
        );
    }

    #[test]
    fn conflict_markers() {
        assert_eq!(
            conflict_contents(Some(b"ours\n"), Some(b"theirs")),
            b"<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>>\n".to_vec()
        );
        assert_eq!(
            conflict_contents(None, Some(b"theirs\n")),
            b"<<<<<<< HEAD\n=======\ntheirs\n>>>>>>>\n".to_vec()
        );
    }

    struct Fixture {
        _dir: TempDir,
        repo: Repository,
        state: RepoState,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let repo = Repository::init(dir.path()).unwrap();
            let state = repo.load_state().unwrap();
            Self {
                _dir: dir,
                repo,
                state,
            }
        }

        fn commit(&mut self, files: &[(&str, &str)], removed: &[&str], message: &str) -> String {
            for (name, contents) in files {
                self.repo.workdir().write(name, contents.as_bytes()).unwrap();
                self.state
                    .add_file(self.repo.store(), self.repo.workdir(), name)
                    .unwrap();
            }
            for name in removed {
                self.state
                    .remove_file(self.repo.store(), self.repo.workdir(), name)
                    .unwrap();
            }
            self.state.commit(self.repo.store(), message).unwrap()
        }

        fn switch(&mut self, branch: &str) {
            crate::core::checkout::checkout_branch(&self.repo, &mut self.state, branch).unwrap();
        }

        fn read(&self, name: &str) -> Option<String> {
            self.repo
                .workdir()
                .read_if_exists(name)
                .unwrap()
                .map(|b| String::from_utf8(b).unwrap())
        }
    }

    #[test]
    fn preconditions() {
        let mut fx = Fixture::new();
        fx.state.branches.add_branch("other").unwrap();

        assert!(matches!(
            merge(&fx.repo, &mut fx.state, "nope"),
            Err(RepoError::NoSuchBranch)
        ));
        assert!(matches!(
            merge(&fx.repo, &mut fx.state, "master"),
            Err(RepoError::SelfMerge)
        ));

        fx.repo.workdir().write("f.txt", b"x").unwrap();
        fx.state
            .add_file(fx.repo.store(), fx.repo.workdir(), "f.txt")
            .unwrap();
        assert!(matches!(
            merge(&fx.repo, &mut fx.state, "other"),
            Err(RepoError::UncommittedChanges)
        ));
    }

    #[test]
    fn already_ancestor() {
        let mut fx = Fixture::new();
        fx.state.branches.add_branch("old").unwrap();
        let head = fx.commit(&[("f.txt", "1")], &[], "ahead");

        let outcome = merge(&fx.repo, &mut fx.state, "old").unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyAncestor);
        assert_eq!(fx.state.branches.current_head(), head);
    }

    #[test]
    fn fast_forward() {
        let mut fx = Fixture::new();
        fx.state.branches.add_branch("feature").unwrap();
        fx.switch("feature");
        let tip = fx.commit(&[("f.txt", "1")], &[], "feature work");
        fx.switch("master");
        let commits_before = fx.state.commits.len();

        let outcome = merge(&fx.repo, &mut fx.state, "feature").unwrap();
        assert_eq!(outcome, MergeOutcome::FastForward { head: tip.clone() });
        assert_eq!(fx.state.branches.current_head(), tip);
        assert_eq!(fx.state.commits.len(), commits_before);
        assert_eq!(fx.read("f.txt").as_deref(), Some("1"));
    }

    #[test]
    fn clean_three_way_merge() {
        let mut fx = Fixture::new();
        fx.commit(&[("keep.txt", "k"), ("gone.txt", "g"), ("edit.txt", "e1")], &[], "base");
        fx.state.branches.add_branch("other").unwrap();
        fx.commit(&[("mine.txt", "m")], &[], "master work");
        fx.switch("other");
        fx.commit(&[("edit.txt", "e2"), ("theirs.txt", "t")], &["gone.txt"], "other work");
        fx.switch("master");

        let outcome = merge(&fx.repo, &mut fx.state, "other").unwrap();
        let commit_hash = match &outcome {
            MergeOutcome::Merged { commit, conflicts } => {
                assert!(conflicts.is_empty());
                commit.clone()
            }
            other => panic!("unexpected outcome {:?}", other),
        };
        assert!(!outcome.has_conflicts());

        let commit: Commit = fx.repo.store().get(&commit_hash).unwrap();
        assert_eq!(commit.message, "Merged other into master.");
        assert_eq!(
            commit.blobs.keys().cloned().collect::<Vec<_>>(),
            vec!["edit.txt", "keep.txt", "mine.txt", "theirs.txt"]
        );
        assert_eq!(fx.read("edit.txt").as_deref(), Some("e2"));
        assert_eq!(fx.read("theirs.txt").as_deref(), Some("t"));
        assert_eq!(fx.read("gone.txt"), None);
        assert!(fx.state.index.is_empty());
    }

    #[test]
    fn conflicting_merge_still_commits() {
        let mut fx = Fixture::new();
        fx.commit(&[("f.txt", "base\n")], &[], "base");
        fx.state.branches.add_branch("other").unwrap();
        let master_head = fx.commit(&[("f.txt", "master\n")], &[], "master edit");
        fx.switch("other");
        fx.commit(&[("f.txt", "other\n")], &[], "other edit");
        fx.switch("master");

        let outcome = merge(&fx.repo, &mut fx.state, "other").unwrap();
        assert!(outcome.has_conflicts());
        assert_eq!(
            fx.read("f.txt").as_deref(),
            Some("<<<<<<< HEAD\nmaster\n=======\nother\n>>>>>>>\n")
        );

        let head: Commit = fx.state.head_commit(fx.repo.store()).unwrap();
        assert_eq!(head.parent.as_deref(), Some(master_head.as_str()));
        assert_eq!(head.message, "Merged other into master.");
    }

    #[test]
    fn merge_with_no_file_changes_still_commits() {
        let mut fx = Fixture::new();
        fx.commit(&[("f.txt", "base")], &[], "base");
        fx.state.branches.add_branch("other").unwrap();
        fx.commit(&[("f.txt", "master")], &[], "master edit");
        fx.switch("other");
        fx.commit(&[("g.txt", "g")], &[], "add g");
        fx.commit(&[], &["g.txt"], "drop g");
        fx.switch("master");

        let before = fx.state.commits.len();
        let outcome = merge(&fx.repo, &mut fx.state, "other").unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged { .. }));
        assert_eq!(fx.state.commits.len(), before + 1);
    }

    #[test]
    fn untracked_collision_blocks_merge() {
        let mut fx = Fixture::new();
        fx.commit(&[("base.txt", "b")], &[], "base");
        fx.state.branches.add_branch("other").unwrap();
        fx.commit(&[("m.txt", "m")], &[], "master");
        fx.switch("other");
        fx.commit(&[("f.txt", "theirs")], &[], "other");
        fx.switch("master");

        fx.repo.workdir().write("f.txt", b"mine").unwrap();
        let head = fx.state.branches.current_head().to_string();
        assert!(matches!(
            merge(&fx.repo, &mut fx.state, "other"),
            Err(RepoError::UntrackedFileConflict(_))
        ));
        assert_eq!(fx.state.branches.current_head(), head);
        assert_eq!(fx.read("f.txt").as_deref(), Some("mine"));
    }
}
