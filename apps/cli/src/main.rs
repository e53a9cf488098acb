//! `waybackjobs` binary entry point.

use clap::Parser;
use color_eyre::Result;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
