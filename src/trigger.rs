//! Runs one trigger: clone, optionally set the committer, commit, push.

use thiserror::Error;

use crate::config::TriggerConfig;
use crate::git::{self, CommandRunner, GitError, RetryingCloner};
use crate::retry::Sleeper;
use crate::types::RepoName;

/// A failed trigger step. Any of these ends the run.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("error cloning git repository {repo} to branch {branch} into subdir {repo}: {source}")]
    Clone {
        repo: RepoName,
        branch: String,
        #[source]
        source: GitError,
    },
    #[error("error setting git user for repository {repo}: {source}")]
    SetUser {
        repo: RepoName,
        #[source]
        source: GitError,
    },
    #[error("error committing trigger commit for repository {repo}: {source}")]
    Commit {
        repo: RepoName,
        #[source]
        source: GitError,
    },
    #[error("error pushing repository {repo} branch {branch} to origin: {source}")]
    Push {
        repo: RepoName,
        branch: String,
        #[source]
        source: GitError,
    },
}

/// Run every step of the trigger in order, stopping at the first failure.
///
/// The same runner used for cloning runs the commit and push steps.
pub fn run<R: CommandRunner, S: Sleeper>(
    config: &TriggerConfig,
    cloner: &RetryingCloner<R, S>,
) -> Result<(), TriggerError> {
    let repo = &config.repo;
    let req = config.clone_request();

    cloner
        .clone_override(&req)
        .map_err(|source| TriggerError::Clone {
            repo: repo.clone(),
            branch: config.branch.clone(),
            source,
        })?;

    let dir = cloner.work_dir().target_dir(&req.subdir);
    let runner = cloner.runner();

    if let Some(user) = &config.git_user {
        git::set_user(runner, &user.name, &user.email, &dir).map_err(|source| {
            TriggerError::SetUser {
                repo: repo.clone(),
                source,
            }
        })?;
    }

    git::commit_empty(runner, &config.build, &dir).map_err(|source| TriggerError::Commit {
        repo: repo.clone(),
        source,
    })?;

    git::push(runner, &config.branch, &dir).map_err(|source| TriggerError::Push {
        repo: repo.clone(),
        branch: config.branch.clone(),
        source,
    })?;

    log::info!(
        "Triggered {} on branch {} for {}",
        repo,
        config.branch,
        config.build.version
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitUser;
    use crate::paths::WorkDir;
    use crate::retry::RetryPolicy;
    use crate::types::BuildInfo;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::tempdir;

    /// Fake git: `clone` initializes a repository at the destination, other
    /// commands are recorded. Fails the command whose subcommand matches
    /// `fail_subcommand`.
    struct FakeGit {
        calls: RefCell<Vec<(Vec<String>, Option<PathBuf>)>>,
        fail_subcommand: Option<&'static str>,
    }

    impl FakeGit {
        fn new(fail_subcommand: Option<&'static str>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_subcommand,
            }
        }

        fn subcommands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(a, _)| a[0].clone()).collect()
        }
    }

    impl CommandRunner for FakeGit {
        fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<(), GitError> {
            self.calls
                .borrow_mut()
                .push((args.to_vec(), cwd.map(Path::to_path_buf)));

            if self.fail_subcommand == Some(args[0].as_str()) {
                return Err(GitError::CommandFailed {
                    subcommand: args[0].clone(),
                    code: Some(128),
                });
            }

            if args[0] == "clone" {
                let dest = Path::new(args.last().unwrap());
                let branch = args
                    .iter()
                    .find_map(|a| a.strip_prefix("--branch="))
                    .unwrap();
                let repo = git2::Repository::init(dest).unwrap();
                let sig = git2::Signature::now("Test", "test@example.com").unwrap();
                let tree_id = repo.index().unwrap().write_tree().unwrap();
                let tree = repo.find_tree(tree_id).unwrap();
                let refname = format!("refs/heads/{branch}");
                repo.commit(Some(&refname), &sig, &sig, "init", &tree, &[])
                    .unwrap();
                repo.set_head(&refname).unwrap();
            }

            Ok(())
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    fn config(root: &Path, git_user: Option<GitUser>) -> TriggerConfig {
        TriggerConfig {
            build: BuildInfo {
                source: "github.com".to_string(),
                owner: "acme".to_string(),
                name: "upstream".to_string(),
                branch: "main".to_string(),
                version: "2.0.0".to_string(),
            },
            repo: "downstream".parse().unwrap(),
            branch: "master".to_string(),
            clone_url: "https://github.com/acme/downstream".to_string(),
            git_user,
            work_dir: WorkDir::new(root),
            shallow_depth: 50,
            retry: RetryPolicy::default(),
        }
    }

    fn cloner(git: FakeGit, config: &TriggerConfig) -> RetryingCloner<FakeGit, NoSleep> {
        RetryingCloner::new(git, NoSleep, config.retry, config.work_dir.clone())
    }

    #[test]
    fn runs_clone_commit_push_in_order() {
        let temp_dir = tempdir().unwrap();
        let config = config(temp_dir.path(), None);
        let cloner = cloner(FakeGit::new(None), &config);

        run(&config, &cloner).unwrap();

        let git = cloner.runner();
        assert_eq!(git.subcommands(), vec!["clone", "commit", "push"]);

        let dest = temp_dir.path().join("downstream");
        let calls = git.calls.borrow();
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[1].1.as_deref(), Some(dest.as_path()));
        assert_eq!(calls[2].1.as_deref(), Some(dest.as_path()));
        assert_eq!(calls[2].0, vec!["push", "origin", "master"]);
        assert_eq!(
            calls[1].0[2],
            "--message=Triggered by github.com/acme/upstream, branch main, version 2.0.0"
        );
    }

    #[test]
    fn sets_user_before_commit_when_configured() {
        let temp_dir = tempdir().unwrap();
        let user = GitUser {
            name: "CI Bot".to_string(),
            email: "ci@example.com".to_string(),
        };
        let config = config(temp_dir.path(), Some(user));
        let cloner = cloner(FakeGit::new(None), &config);

        run(&config, &cloner).unwrap();

        assert_eq!(
            cloner.runner().subcommands(),
            vec!["clone", "config", "config", "commit", "push"]
        );
    }

    #[test]
    fn clone_failure_stops_run() {
        let temp_dir = tempdir().unwrap();
        let config = config(temp_dir.path(), None);
        let cloner = cloner(FakeGit::new(Some("clone")), &config);

        let err = run(&config, &cloner).unwrap_err();

        assert!(matches!(err, TriggerError::Clone { .. }));
        assert_eq!(cloner.runner().subcommands(), vec!["clone"; 3]);
        assert_eq!(
            err.to_string(),
            "error cloning git repository downstream to branch master into subdir downstream: \
             git clone failed: exit status 128"
        );
    }

    #[test]
    fn commit_failure_skips_push() {
        let temp_dir = tempdir().unwrap();
        let config = config(temp_dir.path(), None);
        let cloner = cloner(FakeGit::new(Some("commit")), &config);

        let err = run(&config, &cloner).unwrap_err();

        assert!(matches!(err, TriggerError::Commit { .. }));
        assert_eq!(cloner.runner().subcommands(), vec!["clone", "commit"]);
    }

    #[test]
    fn push_failure_is_reported() {
        let temp_dir = tempdir().unwrap();
        let config = config(temp_dir.path(), None);
        let cloner = cloner(FakeGit::new(Some("push")), &config);

        let err = run(&config, &cloner).unwrap_err();

        assert!(matches!(err, TriggerError::Push { .. }));
        assert!(err.to_string().contains("branch master to origin"));
    }
}
