use crate::core::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The plain files at the top of the working tree.
///
/// Subdirectories and dot-files (including the repository directory itself)
/// are never tracked.
pub struct WorkingDir {
    root: PathBuf,
}

impl WorkingDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Whether `name` can live in the working tree at all: a plain name at
    /// the top level, not hidden and not a path.
    pub fn is_trackable(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Names of all candidate files, sorted.
    pub fn files(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.path_of(name))?)
    }

    /// Contents of `name`, or `None` if it is not in the working tree.
    pub fn read_if_exists(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_of(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> Result<()> {
        fs::write(self.path_of(name), contents)?;
        Ok(())
    }

    /// Deletes `name`; a file that is already gone is not an error.
    pub fn remove(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.path_of(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_only_visible_top_level_files() {
        let dir = TempDir::new().unwrap();
        let wd = WorkingDir::new(dir.path());
        wd.write("b.txt", b"b").unwrap();
        wd.write("a.txt", b"a").unwrap();
        wd.write(".hidden", b"h").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "n").unwrap();

        let files: Vec<String> = wd.files().unwrap().into_iter().collect();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let wd = WorkingDir::new(dir.path());
        wd.write("f", b"x").unwrap();
        assert!(wd.remove("f").unwrap());
        assert!(!wd.remove("f").unwrap());
        assert_eq!(wd.read_if_exists("f").unwrap(), None);
    }

    #[test]
    fn only_top_level_visible_names_are_trackable() {
        assert!(WorkingDir::is_trackable("a.txt"));
        assert!(WorkingDir::is_trackable("Makefile"));
        assert!(!WorkingDir::is_trackable(""));
        assert!(!WorkingDir::is_trackable(".hidden"));
        assert!(!WorkingDir::is_trackable(".."));
        assert!(!WorkingDir::is_trackable("sub/f"));
        assert!(!WorkingDir::is_trackable("../escape"));
        assert!(!WorkingDir::is_trackable("sub\\f"));
    }
}
