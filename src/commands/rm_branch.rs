use crate::core::RepoState;

pub fn run(state: &mut RepoState, name: &str) -> anyhow::Result<()> {
    state.branches.delete_branch(name)?;
    Ok(())
}
