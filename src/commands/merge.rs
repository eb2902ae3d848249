use crate::core::merge::{self, MergeOutcome};
use crate::core::{RepoState, Repository};
use colored::*;

pub fn run(repo: &Repository, state: &mut RepoState, branch: &str) -> anyhow::Result<()> {
    let outcome = merge::merge(repo, state, branch)?;
    match outcome {
        MergeOutcome::AlreadyAncestor => {
            println!("Given branch is an ancestor of the current branch.");
        }
        MergeOutcome::FastForward { .. } => {
            println!("Current branch fast-forwarded.");
        }
        MergeOutcome::Merged { .. } => {
            if outcome.has_conflicts() {
                println!("{}", "Encountered a merge conflict.".yellow());
            }
        }
    }
    Ok(())
}
