//! waste-lens command line entry point

use waste_lens::cli::run_cli;
use waste_lens::shared::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    run_cli().await
}
