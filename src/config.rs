//! Command line and environment configuration.
//!
//! Every flag can also be set through the environment variable the CI server
//! injects for extensions. The parsed flags are turned into a `TriggerConfig`
//! once at startup and passed down explicitly.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::credentials::{CredentialsError, parse_api_token};
use crate::git::CloneRequest;
use crate::paths::{DEFAULT_WORK_DIR, WorkDir};
use crate::retry::RetryPolicy;
use crate::types::{BuildInfo, RepoName};

/// Branch cloned and pushed when none is given.
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Parser, Debug)]
#[command(
    name = "git-trigger",
    version,
    about = "Trigger a build of another repository by pushing an empty commit"
)]
pub struct Cli {
    /// The source of the repository.
    #[arg(long, env = "ESTAFETTE_GIT_SOURCE")]
    pub git_source: String,

    /// The owner of the repository.
    #[arg(long, env = "ESTAFETTE_GIT_OWNER")]
    pub git_owner: String,

    /// The owner plus repository name.
    #[arg(long, env = "ESTAFETTE_GIT_NAME")]
    pub git_name: String,

    /// The branch currently building.
    #[arg(long, env = "ESTAFETTE_GIT_BRANCH")]
    pub git_branch: String,

    /// The version currently building/releasing.
    #[arg(long, env = "ESTAFETTE_BUILD_VERSION")]
    pub build_version: String,

    /// Other repository name to clone from the same owner.
    #[arg(long = "repo", env = "ESTAFETTE_EXTENSION_REPO")]
    pub repo: RepoName,

    /// Branch of the other repository to clone and push to.
    #[arg(long = "branch", env = "ESTAFETTE_EXTENSION_BRANCH")]
    pub branch: Option<String>,

    /// Bitbucket api token credentials configured at the CI server.
    #[arg(
        long,
        env = "ESTAFETTE_CREDENTIALS_BITBUCKET_API_TOKEN",
        hide_env_values = true
    )]
    pub bitbucket_api_token: Option<String>,

    /// Github api token credentials configured at the CI server.
    #[arg(
        long,
        env = "ESTAFETTE_CREDENTIALS_GITHUB_API_TOKEN",
        hide_env_values = true
    )]
    pub github_api_token: Option<String>,

    /// Committer name for the trigger commit (requires --git-user-email).
    #[arg(long, env = "ESTAFETTE_EXTENSION_GIT_USER_NAME")]
    pub git_user_name: Option<String>,

    /// Committer email for the trigger commit (requires --git-user-name).
    #[arg(long, env = "ESTAFETTE_EXTENSION_GIT_USER_EMAIL")]
    pub git_user_email: Option<String>,

    /// Directory the repository is cloned under.
    #[arg(long, env = "ESTAFETTE_WORK_DIR", default_value = DEFAULT_WORK_DIR)]
    pub work_dir: PathBuf,

    /// Clone depth; 0 clones the full history.
    #[arg(long, env = "ESTAFETTE_EXTENSION_SHALLOW_DEPTH", default_value_t = 50)]
    pub shallow_depth: u32,

    /// Number of clone attempts.
    #[arg(long, env = "ESTAFETTE_EXTENSION_CLONE_RETRIES", default_value_t = 3)]
    pub clone_retries: u32,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("--git-user-name and --git-user-email must be set together")]
    IncompleteGitUser,
}

/// Committer identity written into the cloned repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUser {
    pub name: String,
    pub email: String,
}

/// Resolved configuration for one run.
///
/// Not `Debug`: `clone_url` may carry a token.
#[derive(Clone)]
pub struct TriggerConfig {
    pub build: BuildInfo,
    pub repo: RepoName,
    pub branch: String,
    pub clone_url: String,
    pub git_user: Option<GitUser>,
    pub work_dir: WorkDir,
    pub shallow_depth: u32,
    pub retry: RetryPolicy,
}

impl TriggerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let bitbucket_token = non_empty(cli.bitbucket_api_token)
            .map(|json| parse_api_token(&json, "bitbucket"))
            .transpose()?;
        let github_token = non_empty(cli.github_api_token)
            .map(|json| parse_api_token(&json, "github"))
            .transpose()?;

        let clone_url = clone_url(
            &cli.git_source,
            &cli.git_owner,
            &cli.repo,
            bitbucket_token.as_deref(),
            github_token.as_deref(),
        );

        let git_user = match (non_empty(cli.git_user_name), non_empty(cli.git_user_email)) {
            (Some(name), Some(email)) => Some(GitUser { name, email }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteGitUser),
        };

        Ok(Self {
            build: BuildInfo {
                source: cli.git_source,
                owner: cli.git_owner,
                name: cli.git_name,
                branch: cli.git_branch,
                version: cli.build_version,
            },
            branch: non_empty(cli.branch).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            repo: cli.repo,
            clone_url,
            git_user,
            work_dir: WorkDir::new(cli.work_dir),
            shallow_depth: cli.shallow_depth,
            retry: RetryPolicy::default().with_max_attempts(cli.clone_retries),
        })
    }

    /// Clone request for the repository to trigger.
    ///
    /// The repository name doubles as the destination subdirectory.
    pub fn clone_request(&self) -> CloneRequest {
        CloneRequest {
            name: self.repo.clone(),
            url: self.clone_url.clone(),
            branch: self.branch.clone(),
            shallow: self.shallow_depth > 0,
            depth: self.shallow_depth,
            subdir: self.repo.clone(),
        }
    }
}

/// Build the https clone URL, embedding a token when one is available.
///
/// A github token takes precedence over a bitbucket token.
pub fn clone_url(
    source: &str,
    owner: &str,
    repo: &RepoName,
    bitbucket_token: Option<&str>,
    github_token: Option<&str>,
) -> String {
    if let Some(token) = github_token {
        format!("https://x-access-token:{token}@{source}/{owner}/{repo}")
    } else if let Some(token) = bitbucket_token {
        format!("https://x-token-auth:{token}@{source}/{owner}/{repo}")
    } else {
        format!("https://{source}/{owner}/{repo}")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
