use anyhow::Result;
use clap::Parser;
use taskpad::{cli, commands};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    commands::run(args)
}
