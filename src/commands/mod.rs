pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod find;
pub mod global_log;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod rm_branch;
pub mod status;

use crate::core::Repository;
use std::path::Path;
use tracing::debug;

/// One parsed invocation, operands included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    Add { file: String },
    Rm { file: String },
    Commit { message: String },
    Log,
    GlobalLog,
    Find { message: String },
    Status,
    Branch { name: String },
    RmBranch { name: String },
    CheckoutFile { commit: Option<String>, file: String },
    CheckoutBranch { name: String },
    Reset { commit: String },
    Merge { branch: String },
    Config { key: String, value: Option<String> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Add { .. } => "add",
            Command::Rm { .. } => "rm",
            Command::Commit { .. } => "commit",
            Command::Log => "log",
            Command::GlobalLog => "global-log",
            Command::Find { .. } => "find",
            Command::Status => "status",
            Command::Branch { .. } => "branch",
            Command::RmBranch { .. } => "rm-branch",
            Command::CheckoutFile { .. } | Command::CheckoutBranch { .. } => "checkout",
            Command::Reset { .. } => "reset",
            Command::Merge { .. } => "merge",
            Command::Config { .. } => "config",
        }
    }

    /// Commands that write repository state (and so get audited).
    fn mutates_state(&self) -> bool {
        !matches!(
            self,
            Command::Log | Command::GlobalLog | Command::Find { .. } | Command::Status | Command::Config { .. }
        )
    }

    fn audit_details(&self) -> String {
        match self {
            Command::Add { file } | Command::Rm { file } => file.clone(),
            Command::Commit { message } => message.clone(),
            Command::Branch { name } | Command::RmBranch { name } | Command::CheckoutBranch { name } => {
                name.clone()
            }
            Command::CheckoutFile { commit, file } => match commit {
                Some(commit) => format!("{} -- {}", commit, file),
                None => format!("-- {}", file),
            },
            Command::Reset { commit } => commit.clone(),
            Command::Merge { branch } => branch.clone(),
            _ => String::new(),
        }
    }
}

/// Runs `command` against the repository rooted at `root`.
///
/// State is loaded once, handed to the command, and written back once if
/// the command succeeded.
pub fn execute(command: Command, root: &Path) -> anyhow::Result<()> {
    debug!(command = command.name(), "executing");

    if command == Command::Init {
        return init::run(root);
    }

    let repo = Repository::open(root)?;
    if let Command::Config { key, value } = &command {
        return config::run(&repo, key, value.as_deref());
    }

    let mut state = repo.load_state()?;
    match &command {
        Command::Init | Command::Config { .. } => unreachable!("handled above"),
        Command::Add { file } => add::run(&repo, &mut state, file)?,
        Command::Rm { file } => rm::run(&repo, &mut state, file)?,
        Command::Commit { message } => commit::run(&repo, &mut state, message)?,
        Command::Log => log::run(&repo, &state)?,
        Command::GlobalLog => global_log::run(&repo, &state)?,
        Command::Find { message } => find::run(&repo, &state, message)?,
        Command::Status => status::run(&repo, &state)?,
        Command::Branch { name } => branch::run(&mut state, name)?,
        Command::RmBranch { name } => rm_branch::run(&mut state, name)?,
        Command::CheckoutFile { commit, file } => {
            checkout::run_file(&repo, &state, commit.as_deref(), file)?
        }
        Command::CheckoutBranch { name } => checkout::run_branch(&repo, &mut state, name)?,
        Command::Reset { commit } => reset::run(&repo, &mut state, commit)?,
        Command::Merge { branch } => merge::run(&repo, &mut state, branch)?,
    }

    if command.mutates_state() {
        repo.save_state(&state)?;
        repo.audit(command.name(), &command.audit_details())?;
    }
    Ok(())
}
