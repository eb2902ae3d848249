use thiserror::Error;

/// Everything an operation against a repository can fail with.
///
/// User errors carry the exact message printed to the user and leave the
/// repository untouched. The remaining variants mean the persisted state is
/// unreadable or inconsistent and abort the invocation.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Not in an initialized twig directory.")]
    NotARepo,
    #[error("A twig version-control system already exists in the current directory.")]
    AlreadyExists,
    #[error("Incorrect operands.")]
    IncorrectOperands,
    #[error("File does not exist.")]
    FileNotFound,
    #[error("No reason to remove the file.")]
    NothingToRemove,
    #[error("No changes added to the commit.")]
    NothingToCommit,
    #[error("Please enter a commit message.")]
    EmptyMessage,
    #[error("Found no commit with that message.")]
    NoMatchingCommit,
    #[error("A branch with that name already exists.")]
    BranchExists,
    #[error("A branch with that name does not exist.")]
    NoSuchBranch,
    #[error("No such branch exists.")]
    NoSuchCheckoutBranch,
    #[error("Cannot remove the current branch.")]
    CannotDeleteCurrent,
    #[error("No need to checkout the current branch.")]
    AlreadyCurrent,
    #[error("File does not exist in that commit.")]
    FileNotInCommit,
    #[error("No commit with that id exists.")]
    NoSuchCommit,
    #[error("No commit with that id exists.")]
    AmbiguousOrUnknownPrefix(String),
    #[error("There is an untracked file in the way; delete it or add it first.")]
    UntrackedFileConflict(String),
    #[error("You have uncommitted changes.")]
    UncommittedChanges,
    #[error("Cannot merge a branch with itself.")]
    SelfMerge,
    #[error("{0}")]
    InvalidConfig(String),

    #[error("object {0} not found")]
    NotFound(String),
    #[error("object {digest} is a {actual}, expected a {expected}")]
    TypeMismatch {
        digest: String,
        expected: &'static str,
        actual: String,
    },
    #[error("repository corrupted: {0}")]
    Corrupted(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepoError {
    /// True for errors caused by the request rather than by damaged state.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            RepoError::NotFound(_)
                | RepoError::TypeMismatch { .. }
                | RepoError::Corrupted(_)
                | RepoError::Io(_)
                | RepoError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RepoError>;
