//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Assemble [`SyncOptions`] and the GitHub store
//! - Render the sync outcome
//!
//! The CLI layer is thin: all tree work flows through [`crate::sync`].

pub mod args;

pub use args::Cli;

use anyhow::Result;

use crate::config::SyncOptions;
use crate::store::github::GitHubStore;
use crate::ui::output;
use crate::ui::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let options = SyncOptions::new(
        &cli.user,
        &cli.repo,
        &cli.local_path,
        &cli.repo_path,
        &cli.message,
    )
    .branch(&cli.branch)
    .base_branch(&cli.base_branch)
    .create_branch(cli.create_branch)
    .create_pull_request(cli.create_pull_request)
    .preserve_repo_files(cli.preserve_repo_files)
    .debug(cli.debug)
    .quiet(cli.quiet);

    let store = match &cli.api_base {
        Some(api_base) => GitHubStore::with_api_base(&cli.token, &cli.user, &cli.repo, api_base),
        None => GitHubStore::new(&cli.token, &cli.user, &cli.repo),
    };

    let outcome = crate::sync::sync(&store, &options).await?;

    if outcome.unchanged() {
        output::print(
            format!("{}: already up to date", outcome.branch),
            verbosity,
        );
    } else if let Some(commit) = &outcome.commit {
        output::print(
            format!("{}: published commit {}", outcome.branch, commit),
            verbosity,
        );
    }
    if let Some(pr) = &outcome.pull_request {
        output::print(
            format!("opened pull request #{}: {}", pr.number, pr.url),
            verbosity,
        );
    }

    Ok(())
}
