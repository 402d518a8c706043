use anyhow::Result;
use clap::Parser;
use smartspend::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    smartspend::logging::init(cli.verbose);
    cli.run().await
}
