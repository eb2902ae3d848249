use crate::core::checkout;
use crate::core::{RepoState, Repository};

/// `checkout -- <file>` and `checkout <commit> -- <file>`.
pub fn run_file(
    repo: &Repository,
    state: &RepoState,
    commit: Option<&str>,
    file: &str,
) -> anyhow::Result<()> {
    checkout::checkout_file(repo, state, commit, file)?;
    Ok(())
}

/// `checkout <branch>`.
pub fn run_branch(repo: &Repository, state: &mut RepoState, name: &str) -> anyhow::Result<()> {
    checkout::checkout_branch(repo, state, name)?;
    Ok(())
}
