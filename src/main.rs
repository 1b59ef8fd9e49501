mod board;
mod cli;
mod decode;
mod model;
mod solver;
mod sweep;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run(cli::Cli::parse()).await
}
