use crate::core::RepoState;

pub fn run(state: &mut RepoState, name: &str) -> anyhow::Result<()> {
    state.branches.add_branch(name)?;
    Ok(())
}
