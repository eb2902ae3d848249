use crate::core::audit::AuditLog;
use crate::core::branch::{Branches, DEFAULT_BRANCH};
use crate::core::commit::Commit;
use crate::core::config::Config;
use crate::core::error::{RepoError, Result};
use crate::core::object::ObjectStore;
use crate::core::state::RepoState;
use crate::core::workdir::WorkingDir;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPO_DIR_NAME: &str = ".twig";

/// An opened repository: where things live on disk, plus the object store
/// and working tree handles built from that layout.
pub struct Repository {
    pub path: PathBuf,
    pub twig_dir: PathBuf,
    pub config: Config,
    store: ObjectStore,
    workdir: WorkingDir,
}

impl Repository {
    /// Opens the repository rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let twig_dir = path.join(REPO_DIR_NAME);

        if !Self::is_valid_repo(&twig_dir) {
            return Err(RepoError::NotARepo);
        }

        Ok(Self::from_dirs(path, twig_dir))
    }

    /// Creates the repository layout, the root commit and the default
    /// branch.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let twig_dir = path.join(REPO_DIR_NAME);

        if twig_dir.exists() {
            return Err(RepoError::AlreadyExists);
        }

        std::fs::create_dir_all(twig_dir.join("objects"))?;
        std::fs::create_dir_all(twig_dir.join("logs"))?;

        let repo = Self::from_dirs(path, twig_dir);
        let root = repo.store.put(&Commit::root())?;
        let state = RepoState::new(Branches::new(DEFAULT_BRANCH, &root), root.clone());
        state.save(&repo.state_path())?;
        AuditLog::create(&repo.audit_log_path())?;

        info!(root = %root, path = %repo.path.display(), "initialized repository");
        Ok(repo)
    }

    fn from_dirs(path: PathBuf, twig_dir: PathBuf) -> Self {
        let config = Config::load_layered(&twig_dir.join("config.json"));
        let store = ObjectStore::new(twig_dir.join("objects"), config.compression_level());
        let workdir = WorkingDir::new(&path);
        Self {
            path,
            twig_dir,
            config,
            store,
            workdir,
        }
    }

    fn is_valid_repo(twig_dir: &Path) -> bool {
        twig_dir.join("objects").is_dir() && twig_dir.join("state.json").is_file()
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn workdir(&self) -> &WorkingDir {
        &self.workdir
    }

    pub fn state_path(&self) -> PathBuf {
        self.twig_dir.join("state.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.twig_dir.join("config.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.twig_dir.join("logs")
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.logs_dir().join("audit.log")
    }

    pub fn load_state(&self) -> Result<RepoState> {
        RepoState::load(&self.state_path())
    }

    pub fn save_state(&self, state: &RepoState) -> Result<()> {
        state.save(&self.state_path())
    }

    /// Appends to the audit log when auditing is enabled.
    pub fn audit(&self, action: &str, details: &str) -> Result<()> {
        if !self.config.audit_enabled() {
            return Ok(());
        }
        AuditLog::append(&self.audit_log_path(), action, details)
    }
}
