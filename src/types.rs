//! Shared types for git-trigger

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("value cannot be empty")]
    Empty,
    #[error("value cannot contain '..'")]
    PathTraversal,
    #[error("value cannot contain path separators")]
    PathSeparator,
    #[error("value cannot start with '{0}'")]
    InvalidStart(char),
    #[error("value cannot contain null or control characters")]
    ControlCharacter,
}

/// A repository name that doubles as the subdirectory it is cloned into.
///
/// Validation rules:
/// - Non-empty, and not `.`
/// - No `..`, `/` or `\`
/// - Cannot start with `-` (would be read as a flag)
/// - No null bytes or control characters
///
/// Together these guarantee that joining the name onto a root stays directly
/// under that root, so distinct names map to distinct directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName(String);

impl RepoName {
    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepoName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if s.contains("..") {
            return Err(ParseError::PathTraversal);
        }
        if s.contains('/') || s.contains('\\') {
            return Err(ParseError::PathSeparator);
        }
        if s.starts_with('-') {
            return Err(ParseError::InvalidStart('-'));
        }
        if s == "." {
            return Err(ParseError::InvalidStart('.'));
        }
        if s.bytes().any(|b| b < 0x20 || b == 0x7f) {
            return Err(ParseError::ControlCharacter);
        }

        Ok(RepoName(s.to_string()))
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build metadata of the upstream repository that fired the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Host of the repository, e.g. `github.com`.
    pub source: String,
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub version: String,
}

impl BuildInfo {
    /// Message used for the empty trigger commit.
    pub fn commit_message(&self) -> String {
        format!(
            "Triggered by {}/{}/{}, branch {}, version {}",
            self.source, self.owner, self.name, self.branch, self.version
        )
    }
}
