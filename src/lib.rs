pub mod commands;
pub mod core;
pub mod logging;

pub use core::branch::Branches;
pub use core::commit::Commit;
pub use core::config::Config;
pub use core::error::RepoError;
pub use core::index::Index;
pub use core::object::{Blob, ObjectStore, ObjectType};
pub use core::repository::Repository;
pub use core::state::RepoState;
