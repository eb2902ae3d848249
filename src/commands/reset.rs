use crate::core::checkout;
use crate::core::{RepoState, Repository};

pub fn run(repo: &Repository, state: &mut RepoState, commit: &str) -> anyhow::Result<()> {
    checkout::reset(repo, state, commit)?;
    Ok(())
}
