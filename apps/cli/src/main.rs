//! Playground CLI: run the AI tool pipeline and contact relay from a terminal.
//!
//! Each tool command prints its response as JSON on stdout and exits
//! non-zero when the request did not succeed.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
