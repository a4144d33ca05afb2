//! Command-line interface for evaluating operator pathways.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
