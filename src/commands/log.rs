use crate::core::{Commit, CommitGraph, RepoState, Repository};

/// History of the current branch, newest first, following first parents.
pub fn run(repo: &Repository, state: &RepoState) -> anyhow::Result<()> {
    let graph = CommitGraph::new(repo.store());
    for hash in graph.ancestor_chain(state.branches.current_head())? {
        let commit: Commit = repo.store().get(&hash)?;
        println!("{}", commit.format_for_log(&hash));
    }
    Ok(())
}
