use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use twig::commands::{self, Command};
use twig::core::repository::REPO_DIR_NAME;
use twig::core::{Config, RepoError};
use twig::logging;

#[derive(Parser)]
#[command(name = "twig")]
#[command(about = "A small local version control system")]
#[command(version = "0.1.0")]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository in the current directory
    Init,
    /// Stage a file for the next commit
    Add { file: String },
    /// Unstage a file, or untrack and delete it
    Rm { file: String },
    /// Record the staged changes
    Commit { message: String },
    /// Show the current branch's history
    Log,
    /// Show every commit ever made
    #[command(name = "global-log")]
    GlobalLog,
    /// Print the ids of commits with the given message
    Find { message: String },
    /// Show branches, staged, removed, modified and untracked files
    Status,
    /// Create a branch at the current head
    Branch { name: String },
    /// Delete a branch
    #[command(name = "rm-branch")]
    RmBranch { name: String },
    /// `checkout <branch>`, `checkout -- <file>` or `checkout <commit> -- <file>`
    Checkout {
        target: Option<String>,
        #[arg(last = true)]
        file: Vec<String>,
    },
    /// Move the current branch to a commit
    Reset { commit: String },
    /// Merge a branch into the current branch
    Merge { branch: String },
    /// Read or write a repository setting
    Config { key: String, value: Option<String> },
}

impl Commands {
    fn into_command(self) -> Result<Command, RepoError> {
        let command = match self {
            Commands::Init => Command::Init,
            Commands::Add { file } => Command::Add { file },
            Commands::Rm { file } => Command::Rm { file },
            Commands::Commit { message } => Command::Commit { message },
            Commands::Log => Command::Log,
            Commands::GlobalLog => Command::GlobalLog,
            Commands::Find { message } => Command::Find { message },
            Commands::Status => Command::Status,
            Commands::Branch { name } => Command::Branch { name },
            Commands::RmBranch { name } => Command::RmBranch { name },
            Commands::Checkout { target, mut file } => match (target, file.len()) {
                (Some(name), 0) => Command::CheckoutBranch { name },
                (commit, 1) => Command::CheckoutFile {
                    commit,
                    file: file.remove(0),
                },
                _ => return Err(RepoError::IncorrectOperands),
            },
            Commands::Reset { commit } => Command::Reset { commit },
            Commands::Merge { branch } => Command::Merge { branch },
            Commands::Config { key, value } => Command::Config { key, value },
        };
        Ok(command)
    }
}

fn main() -> ExitCode {
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load_layered(&root.join(REPO_DIR_NAME).join("config.json"));
    logging::init_logging(config.log_level());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return report_parse_error(e),
    };

    let result = cli
        .command
        .into_command()
        .map_err(anyhow::Error::from)
        .and_then(|command| commands::execute(command, &root));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(e),
    }
}

fn report_parse_error(e: clap::Error) -> ExitCode {
    let message = match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            "Please enter a command."
        }
        ErrorKind::InvalidSubcommand => "No command with that name exists.",
        _ => "Incorrect operands.",
    };
    println!("{}", message);
    ExitCode::FAILURE
}

fn report_error(e: anyhow::Error) -> ExitCode {
    match e.downcast_ref::<RepoError>() {
        Some(repo_error) if repo_error.is_user_error() => println!("{}", repo_error),
        _ => eprintln!("{} {:#}", "fatal:".red().bold(), e),
    }
    ExitCode::FAILURE
}
