use crate::core::{RepoState, Repository};

pub fn run(repo: &Repository, state: &mut RepoState, file: &str) -> anyhow::Result<()> {
    state.remove_file(repo.store(), repo.workdir(), file)?;
    Ok(())
}
