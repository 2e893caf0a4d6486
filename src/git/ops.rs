//! Single-shot git steps run inside a cloned repository.

use std::path::Path;

use super::cli::{CommandRunner, GitError, validate_git_ref};
use crate::types::BuildInfo;

/// Set the committer identity for the repository at `dir`.
pub fn set_user<R: CommandRunner>(
    runner: &R,
    username: &str,
    email: &str,
    dir: &Path,
) -> Result<(), GitError> {
    log::info!(
        "Setting user name {} and email {} for repository in {}...",
        username,
        email,
        dir.display()
    );

    runner.run(
        &["config".to_string(), "user.email".to_string(), email.to_string()],
        Some(dir),
    )?;
    runner.run(
        &["config".to_string(), "user.name".to_string(), username.to_string()],
        Some(dir),
    )?;

    Ok(())
}

/// Create an empty commit describing the upstream build.
pub fn commit_empty<R: CommandRunner>(
    runner: &R,
    build: &BuildInfo,
    dir: &Path,
) -> Result<(), GitError> {
    log::info!(
        "Creating empty commit for repository {}/{}/{}...",
        build.source,
        build.owner,
        build.name
    );

    let args = vec![
        "commit".to_string(),
        "--allow-empty".to_string(),
        format!("--message={}", build.commit_message()),
    ];
    runner.run(&args, Some(dir))
}

/// Push `branch` to origin.
pub fn push<R: CommandRunner>(runner: &R, branch: &str, dir: &Path) -> Result<(), GitError> {
    validate_git_ref(branch, "branch")?;

    log::info!("Pushing empty commit in {} to origin...", dir.display());

    let args = vec!["push".to_string(), "origin".to_string(), branch.to_string()];
    runner.run(&args, Some(dir))
}
