mod cli;
mod client;
mod fasta;
mod model;
mod normalize;
mod orchestrator;
mod progress;
mod ready;
mod store;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod view;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = cli::Cli::parse();
    cli::run(args).await
}
