//! Binary crate for the `weathercard` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and city picking
//! - Showing weather card resources in the terminal or as an HTML preview

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod viewer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries resources, so logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
