use crate::core::{Commit, RepoState, Repository};

/// Every commit ever made, in creation order.
pub fn run(repo: &Repository, state: &RepoState) -> anyhow::Result<()> {
    for hash in &state.commits {
        let commit: Commit = repo.store().get(hash)?;
        println!("{}", commit.format_for_log(hash));
    }
    Ok(())
}
