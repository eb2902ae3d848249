pub mod audit;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod merge;
pub mod object;
pub mod repository;
pub mod state;
pub mod status;
pub mod workdir;

pub use branch::Branches;
pub use commit::Commit;
pub use config::Config;
pub use error::{RepoError, Result};
pub use graph::CommitGraph;
pub use index::Index;
pub use merge::MergeOutcome;
pub use object::{Blob, Object, ObjectStore, ObjectType};
pub use repository::Repository;
pub use state::RepoState;
pub use status::Status;
pub use workdir::WorkingDir;
