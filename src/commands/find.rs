use crate::core::{RepoState, Repository};

pub fn run(repo: &Repository, state: &RepoState, message: &str) -> anyhow::Result<()> {
    for hash in state.find_by_message(repo.store(), message)? {
        println!("{}", hash);
    }
    Ok(())
}
