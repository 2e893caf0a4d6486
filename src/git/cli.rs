//! Git CLI invocation and libgit2 read helpers.
//!
//! Every write operation (clone, config, commit, push) shells out to the git
//! binary with inherited stdout/stderr so its progress shows up in the CI log.
//! libgit2 is only used to inspect a finished clone.

use git2::Repository;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Errors returned by git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// libgit2 reported an error.
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
    /// Repository path does not contain a git repo.
    #[error("repository not found at {0}")]
    NotFound(String),
    /// The git process exited unsuccessfully.
    #[error("git {subcommand} failed: {}", describe_exit(.code))]
    CommandFailed {
        subcommand: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
    },
    /// Underlying IO error, including failure to spawn git.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid inputs were provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Reject a branch or tag name that git could misread.
///
/// `what` names the value in the error message.
pub fn validate_git_ref(value: &str, what: &str) -> Result<(), GitError> {
    let problem = if value.is_empty() {
        "is empty"
    } else if value.starts_with('-') {
        "would be read as an option"
    } else if value.contains("..") {
        "contains '..'"
    } else if value.bytes().any(|b| b.is_ascii_control()) {
        "contains control characters"
    } else {
        return Ok(());
    };

    Err(GitError::InvalidInput(format!("{what} {value:?} {problem}")))
}

/// Runs one git command to completion.
///
/// `args` excludes the program name. When `cwd` is `None` the command runs in
/// the current working directory of the process.
pub trait CommandRunner {
    fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<(), GitError>;
}

/// Git CLI wrapper with hardening for unattended use.
pub struct GitCli {
    git_path: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Create a new GitCli instance using the system git.
    pub fn new() -> Self {
        Self {
            git_path: "git".into(),
        }
    }

    #[cfg(test)]
    fn with_git_path(mut self, git_path: impl Into<String>) -> Self {
        self.git_path = git_path.into();
        self
    }

    /// Create a hardened Command.
    ///
    /// Applies:
    /// - `GIT_LFS_SKIP_SMUDGE=1` - skip LFS file downloads
    /// - `GIT_TERMINAL_PROMPT=0` - fail instead of prompting for credentials
    /// - stdin closed, stdout/stderr inherited
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.env("GIT_LFS_SKIP_SMUDGE", "1");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        cmd
    }
}

impl CommandRunner for GitCli {
    fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status()?;
        if !status.success() {
            return Err(GitError::CommandFailed {
                subcommand: args.first().cloned().unwrap_or_default(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// What a fresh clone has checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    /// Local branch name, `None` when HEAD is detached (e.g. a tag was cloned).
    pub branch: Option<String>,
    pub commit: String,
}

impl fmt::Display for HeadInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "branch {} at commit {}", branch, self.commit),
            None => write!(f, "detached HEAD at commit {}", self.commit),
        }
    }
}

/// Open the repository a clone produced at `dest`.
pub fn open_clone(dest: &Path) -> Result<Repository, GitError> {
    match Repository::open(dest) {
        Ok(repo) => Ok(repo),
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            Err(GitError::NotFound(dest.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read the commit HEAD points at, and its branch if it is on one.
///
/// An unborn HEAD (no commits) is an error.
pub fn describe_head(repo: &Repository) -> Result<HeadInfo, GitError> {
    let head = repo.head()?;
    let commit = head.peel_to_commit()?.id().to_string();
    let branch = if head.is_branch() {
        head.shorthand().map(str::to_string)
    } else {
        None
    };

    Ok(HeadInfo { branch, commit })
}
