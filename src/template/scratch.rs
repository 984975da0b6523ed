use std::path::{Path, PathBuf};

use crate::error::{Result, SproutError};

/// Directory inside an extracted npm tarball that wraps the payload.
pub const PACKAGE_DIR: &str = "package";

/// The extraction workspace for downloaded template archives.
///
/// The same path is reused by every run on the machine. Nothing guards
/// against two concurrent invocations sharing it.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clear leftovers from a previous run, then create the directory.
    pub fn acquire(&self) -> Result<&Path> {
        self.clear()?;
        std::fs::create_dir_all(&self.path).map_err(|e| SproutError::Io {
            context: format!("creating scratch directory {}", self.path.display()),
            source: e,
        })?;
        Ok(&self.path)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_dir_all(&self.path).map_err(|e| SproutError::Io {
                context: format!("removing stale scratch directory {}", self.path.display()),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Remove the directory once its content is no longer needed.
    pub fn release(&self) -> Result<()> {
        self.clear()
    }

    /// Root of the extracted template package.
    pub fn package_root(&self) -> PathBuf {
        self.path.join(PACKAGE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_clears_stale_content() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path().join("scratch"));

        scratch.acquire().unwrap();
        std::fs::create_dir_all(scratch.package_root()).unwrap();
        std::fs::write(scratch.package_root().join("stale.txt"), "old").unwrap();

        scratch.acquire().unwrap();
        assert!(scratch.path().is_dir());
        assert!(!scratch.package_root().exists());
    }

    #[test]
    fn release_removes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path().join("scratch"));
        scratch.acquire().unwrap();
        scratch.release().unwrap();
        assert!(!scratch.path().exists());
        scratch.release().unwrap();
    }

    #[test]
    fn package_root_is_nested() {
        let scratch = ScratchDir::new("/tmp/sprout-scratch");
        assert_eq!(
            scratch.package_root(),
            PathBuf::from("/tmp/sprout-scratch/package")
        );
    }
}
