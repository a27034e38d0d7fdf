//! Canopy binary entry point.

use canopy::cli;
use canopy::ui::output;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
