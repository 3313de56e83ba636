//! Where persisted files live.
//!
//! Every [`SerializedDict`](crate::SerializedDict) is rooted in one data
//! directory. Resolve it once with [`DataDir`] and hand it to each store; the
//! store never looks at the environment itself.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable read by [`DataDir::from_env`].
pub const DIR_ENV: &str = "FILEDICT_DIR";

/// Name of the snapshot subdirectory inside the data directory.
pub const BACKUPS_DIR: &str = "backups";

/// The directory that holds live files and the `backups/` subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory. Nothing is checked or created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the data directory from `FILEDICT_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_var(DIR_ENV)
    }

    pub(crate) fn from_var(var: &str) -> Result<Self> {
        match std::env::var_os(var) {
            Some(v) if !v.is_empty() => Ok(Self::new(v)),
            _ => Err(Error::Config(format!("{var} is not set"))),
        }
    }

    /// The directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the live file for logical name `name`.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of the snapshot directory.
    pub fn backups(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    /// Create the data directory and its `backups/` subdirectory if missing.
    pub fn create(&self) -> Result<()> {
        std::fs::create_dir_all(self.backups())?;
        Ok(())
    }
}

impl AsRef<Path> for DataDir {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let dir = DataDir::new("/srv/data");
        assert_eq!(dir.file("projects.json"), Path::new("/srv/data/projects.json"));
        assert_eq!(dir.backups(), Path::new("/srv/data/backups"));
    }

    #[test]
    fn unset_var_is_config_error() {
        let err = DataDir::from_var("FILEDICT_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn set_var_resolves() {
        std::env::set_var("FILEDICT_TEST_DIR_RESOLVES", "/tmp/fd");
        let dir = DataDir::from_var("FILEDICT_TEST_DIR_RESOLVES").unwrap();
        assert_eq!(dir.root(), Path::new("/tmp/fd"));
    }

    #[test]
    fn create_makes_backups_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path().join("nested"));
        dir.create().unwrap();
        assert!(dir.backups().is_dir());
        // idempotent
        dir.create().unwrap();
    }
}
