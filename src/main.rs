pub mod config;
pub mod credentials;
pub mod git;
pub mod paths;
pub mod retry;
pub mod trigger;
pub mod types;

use clap::Parser;

use crate::config::{Cli, TriggerConfig};
use crate::git::{GitCli, RetryingCloner, redact_url};
use crate::retry::ThreadSleeper;

fn main() {
    init_logging();

    let cli = Cli::parse();

    log::info!(
        "Starting git-trigger version {}...",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stdout without timestamps; the CI log adds its own.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = TriggerConfig::from_cli(cli)?;

    log::debug!(
        "Triggering {} on branch {} via {} in {}",
        config.repo,
        config.branch,
        redact_url(&config.clone_url),
        config.work_dir.root().display()
    );

    let cloner = RetryingCloner::new(
        GitCli::new(),
        ThreadSleeper,
        config.retry,
        config.work_dir.clone(),
    );

    trigger::run(&config, &cloner)?;

    Ok(())
}
