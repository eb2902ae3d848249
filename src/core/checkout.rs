use crate::core::commit::Commit;
use crate::core::error::{RepoError, Result};
use crate::core::object::Blob;
use crate::core::repository::Repository;
use crate::core::state::RepoState;
use crate::core::workdir::WorkingDir;
use tracing::{debug, info};

/// Restores `name` from `commit` (or from the head when `None`) into the
/// working tree. The index is left alone.
pub fn checkout_file(
    repo: &Repository,
    state: &RepoState,
    commit: Option<&str>,
    name: &str,
) -> Result<()> {
    if !WorkingDir::is_trackable(name) {
        return Err(RepoError::FileNotInCommit);
    }
    let hash = match commit {
        Some(prefix) => state.resolve_commit(prefix)?,
        None => state.branches.current_head().to_string(),
    };

    let commit: Commit = repo.store().get(&hash)?;
    let blob_hash = commit.blob(name).ok_or(RepoError::FileNotInCommit)?;
    let blob: Blob = repo.store().get(blob_hash)?;
    repo.workdir().write(name, blob.contents())?;

    debug!(file = name, commit = %hash, "checked out file");
    Ok(())
}

/// Switches to branch `name`, replacing the tracked files in the working
/// tree with the ones at the branch head.
pub fn checkout_branch(repo: &Repository, state: &mut RepoState, name: &str) -> Result<()> {
    let target = state
        .branches
        .head_of(name)
        .cloned()
        .ok_or(RepoError::NoSuchCheckoutBranch)?;
    if state.branches.current_name() == name {
        return Err(RepoError::AlreadyCurrent);
    }

    materialize(repo, state, &target)?;
    state.index.clear();
    state.branches.set_current_branch(name)?;

    info!(branch = name, head = %target, "switched branch");
    Ok(())
}

/// Moves the current branch to the commit named by `prefix` and makes the
/// working tree match it.
pub fn reset(repo: &Repository, state: &mut RepoState, prefix: &str) -> Result<()> {
    let target = state
        .resolve_commit(prefix)
        .map_err(|_| RepoError::NoSuchCommit)?;

    materialize(repo, state, &target)?;
    state.branches.advance_current_branch(&target);
    state.index.clear();

    info!(commit = %target, "reset current branch");
    Ok(())
}

/// Fails if some file that neither the head nor the index knows about
/// would be overwritten by `target`.
pub(crate) fn check_untracked(repo: &Repository, state: &RepoState, target: &Commit) -> Result<()> {
    let head = state.head_commit(repo.store())?;
    for name in repo.workdir().files()? {
        let untracked = !head.is_tracking(&name) && !state.index.is_staged(&name);
        if untracked && target.is_tracking(&name) {
            return Err(RepoError::UntrackedFileConflict(name));
        }
    }
    Ok(())
}

/// Writes every file of `target_hash` and deletes files the head tracks
/// that `target_hash` does not. Nothing is touched if the untracked-file
/// check fails.
pub(crate) fn materialize(repo: &Repository, state: &RepoState, target_hash: &str) -> Result<()> {
    let target: Commit = repo.store().get(target_hash)?;
    check_untracked(repo, state, &target)?;

    let mut contents = Vec::with_capacity(target.blobs.len());
    for (name, blob_hash) in &target.blobs {
        let blob: Blob = repo.store().get(blob_hash)?;
        contents.push((name, blob));
    }

    let head = state.head_commit(repo.store())?;
    for (name, blob) in &contents {
        repo.workdir().write(name, blob.contents())?;
    }
    for name in head.blobs.keys() {
        if !target.is_tracking(name) {
            repo.workdir().remove(name)?;
        }
    }

    debug!(commit = target_hash, files = contents.len(), "materialized commit");
    Ok(())
}
