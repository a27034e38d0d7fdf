//! cli::args
//!
//! Command-line argument definitions using clap derive.

use clap::Parser;
use std::path::PathBuf;

/// Canopy - publish a local directory into a GitHub repository path
///
/// Reads one flat directory and makes the target path on the target branch
/// look exactly like it (or additively merged with it), using only the Git
/// Data API - no clone, no working copy.
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, value_name = "USER")]
    pub user: String,

    /// Repository name
    #[arg(long, value_name = "REPO")]
    pub repo: String,

    /// Local flat directory to publish
    #[arg(long, value_name = "DIR")]
    pub local_path: PathBuf,

    /// Slash-separated target path inside the repository
    #[arg(long, value_name = "PATH")]
    pub repo_path: String,

    /// Commit message; its first line becomes the PR title
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: String,

    /// Target branch
    #[arg(long, default_value = "master")]
    pub branch: String,

    /// Base branch for branch creation and as PR base
    #[arg(long, default_value = "master")]
    pub base_branch: String,

    /// Create the branch from the base branch if it does not exist
    #[arg(long)]
    pub create_branch: bool,

    /// Open a pull request from the branch into the base branch
    #[arg(long)]
    pub create_pull_request: bool,

    /// Keep remote files at the target path that are absent locally
    #[arg(long)]
    pub preserve_repo_files: bool,

    /// OAuth or personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Custom API base URL (GitHub Enterprise)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Enable debug trace output
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
