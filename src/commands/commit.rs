use crate::core::{RepoState, Repository};

pub fn run(repo: &Repository, state: &mut RepoState, message: &str) -> anyhow::Result<()> {
    state.commit(repo.store(), message)?;
    Ok(())
}
