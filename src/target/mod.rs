use std::path::{Path, PathBuf};

use crate::error::{Result, SproutError};

/// Project directory used when the user gives no name.
pub const DEFAULT_PROJECT_NAME: &str = "sprout-project";

/// Version-control directory that never counts as existing content.
const VCS_MARKER: &str = ".git";

/// The target directory as derived once per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub raw_input: String,
    pub normalized_path: String,
    pub exists: bool,
    pub is_empty: bool,
}

/// What to do with a target directory that already has content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Delete everything except the VCS marker, then continue.
    RemoveAndContinue,
    /// Abort the whole run.
    Cancel,
    /// Write over existing files without deleting anything first.
    IgnoreAndContinue,
}

impl Disposition {
    pub const ALL: [Disposition; 3] = [
        Disposition::RemoveAndContinue,
        Disposition::Cancel,
        Disposition::IgnoreAndContinue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Disposition::RemoveAndContinue => "Remove existing files and continue",
            Disposition::Cancel => "Cancel operation",
            Disposition::IgnoreAndContinue => "Ignore files and continue",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trim whitespace and trailing slash runs; fall back to the default name.
pub fn normalize_target(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        if trimmed.starts_with('/') {
            return "/".to_string();
        }
        return DEFAULT_PROJECT_NAME.to_string();
    }
    stripped.to_string()
}

/// A directory is empty when it has no entries or only the VCS marker.
/// A missing directory is empty.
pub fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    let mut names = Vec::new();
    let entries = std::fs::read_dir(path).map_err(|e| SproutError::Io {
        context: format!("reading directory {}", path.display()),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SproutError::Io {
            context: format!("reading entry in {}", path.display()),
            source: e,
        })?;
        names.push(entry.file_name());
        if names.len() > 1 {
            return Ok(false);
        }
    }
    Ok(match names.as_slice() {
        [] => true,
        [only] => only == VCS_MARKER,
        _ => false,
    })
}

impl TargetSpec {
    /// Normalize the raw argument and inspect the directory it names.
    pub fn resolve(raw: Option<&str>) -> Result<Self> {
        let normalized_path = normalize_target(raw);
        let path = Path::new(&normalized_path);
        let exists = path.exists();
        let is_empty = if exists { is_dir_empty(path)? } else { true };

        Ok(Self {
            raw_input: raw.unwrap_or_default().to_string(),
            normalized_path,
            exists,
            is_empty,
        })
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.normalized_path)
    }

    pub fn is_current_dir(&self) -> bool {
        self.normalized_path == "."
    }

    /// True when existing content forces an overwrite decision.
    pub fn has_conflict(&self) -> bool {
        self.exists && !self.is_empty
    }

    /// Human-facing name of the target, e.g. for conflict messages.
    pub fn describe(&self) -> String {
        if self.is_current_dir() {
            "Current directory".to_string()
        } else {
            format!("Target directory \"{}\"", self.normalized_path)
        }
    }

    pub fn conflict_message(&self) -> String {
        format!("{} is not empty. Please choose how to proceed:", self.describe())
    }

    /// Final component of the target's absolute path; used as the default
    /// project name offered to template questions.
    pub fn base_name(&self) -> String {
        let absolute = if self.path().is_absolute() {
            self.path().to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(self.path()))
                .unwrap_or_else(|_| self.path().to_path_buf())
        };
        let absolute = absolute.canonicalize().unwrap_or(absolute);
        absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.normalized_path.clone())
    }
}

/// Remove every entry of `path` except the VCS marker.
pub fn empty_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let entries = std::fs::read_dir(path).map_err(|e| SproutError::Io {
        context: format!("reading directory {}", path.display()),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SproutError::Io {
            context: format!("reading entry in {}", path.display()),
            source: e,
        })?;
        if entry.file_name() == VCS_MARKER {
            continue;
        }
        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(|e| SproutError::Io {
            context: format!("reading file type of {}", entry_path.display()),
            source: e,
        })?;
        let removed = if file_type.is_dir() {
            std::fs::remove_dir_all(&entry_path)
        } else {
            std::fs::remove_file(&entry_path)
        };
        removed.map_err(|e| SproutError::Io {
            context: format!("removing {}", entry_path.display()),
            source: e,
        })?;
    }
    Ok(())
}

/// Create the target directory and any missing ancestors.
pub fn ensure_exists(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path).map_err(|e| SproutError::Io {
        context: format!("creating target directory {}", path.display()),
        source: e,
    })?;
    Ok(path.to_path_buf())
}

/// Carry out a disposition on a conflicting target.
pub fn apply_disposition(disposition: Disposition, path: &Path) -> Result<()> {
    match disposition {
        Disposition::RemoveAndContinue => empty_dir(path),
        Disposition::Cancel => Err(SproutError::Cancelled),
        Disposition::IgnoreAndContinue => Ok(()),
    }
}
