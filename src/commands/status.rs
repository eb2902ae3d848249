use crate::core::{RepoState, Repository, Status};
use colored::*;

pub fn run(repo: &Repository, state: &RepoState) -> anyhow::Result<()> {
    let status = Status::compute(repo, state)?;
    print!("{}", render(&status));
    Ok(())
}

fn render(status: &Status) -> String {
    let mut out = String::new();

    out.push_str("=== Branches ===\n");
    for name in &status.branches {
        if *name == status.current_branch {
            out.push_str(&format!("{}\n", format!("*{}", name).green()));
        } else {
            out.push_str(&format!("{}\n", name));
        }
    }
    out.push('\n');

    push_section(&mut out, "Staged Files", status.staged.iter().cloned());
    push_section(&mut out, "Removed Files", status.removed.iter().cloned());
    push_section(
        &mut out,
        "Modifications Not Staged For Commit",
        status
            .unstaged
            .iter()
            .map(|(name, change)| format!("{} ({})", name, change)),
    );
    push_section(&mut out, "Untracked Files", status.untracked.iter().cloned());
    out
}

fn push_section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    out.push_str(&format!("=== {} ===\n", title));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::Change;

    #[test]
    fn renders_sections_in_order() {
        colored::control::set_override(false);
        let status = Status {
            current_branch: "master".to_string(),
            branches: vec!["dev".to_string(), "master".to_string()],
            staged: vec!["a.txt".to_string()],
            removed: vec![],
            unstaged: vec![("b.txt".to_string(), Change::Deleted)],
            untracked: vec!["c.txt".to_string()],
        };

        let expected = "=== Branches ===\ndev\n*master\n\n\
                        === Staged Files ===\na.txt\n\n\
                        === Removed Files ===\n\n\
                        === Modifications Not Staged For Commit ===\nb.txt (deleted)\n\n\
                        === Untracked Files ===\nc.txt\n\n";
        assert_eq!(render(&status), expected);
    }
}
