//! Git operations: the retrying clone and the trigger steps that follow it.

mod cli;
mod clone;
mod ops;

pub use cli::{CommandRunner, GitCli, GitError};
pub use clone::{CloneRequest, RetryingCloner, redact_url};
pub use ops::{commit_empty, push, set_user};
