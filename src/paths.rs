//! Working directory path management
//!
//! All repositories touched by a run live directly under one fixed root:
//!
//! ```text
//! /estafette-work/
//! └── <repo>/        # clone destination, also the cwd for commit/push
//! ```
//!
//! The root itself is provided by the CI environment and is never created here.

use std::path::{Path, PathBuf};

use crate::types::RepoName;

/// Root used by the CI runner when none is configured.
pub const DEFAULT_WORK_DIR: &str = "/estafette-work";

/// Resolves destination paths under the working directory root
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Creates a new WorkDir with the specified root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory a repository is cloned into: `{root}/{subdir}`
    pub fn target_dir(&self, subdir: &RepoName) -> PathBuf {
        self.root.join(subdir.as_str())
    }
}

impl Default for WorkDir {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_DIR)
    }
}
