use crate::core::Repository;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let repo = Repository::init(root)?;
    repo.audit("init", &repo.path.display().to_string())?;
    Ok(())
}
