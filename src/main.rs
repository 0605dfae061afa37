//! mpitrace: rebuild a binary MPI trace from its ASCII rendering.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use mpitrace::{convert, init_logging, Config};

#[derive(Debug, Parser)]
#[command(name = "mpitrace")]
#[command(about = "Convert ASCII MPI traces to the binary trace format")]
#[command(version)]
struct Command {
    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Binary trace to write
    #[arg(short, long)]
    output: PathBuf,
    /// Succeed even when some lines could not be matched
    #[arg(long)]
    allow_unmatched: bool,
    /// ASCII inputs, concatenated in order (standard input when omitted)
    inputs: Vec<PathBuf>,
}

impl From<Command> for Config {
    fn from(opts: Command) -> Self {
        Config {
            verbosity: opts.verbose,
            inputs: opts.inputs,
            output: opts.output,
            allow_unmatched: opts.allow_unmatched,
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from(Command::parse());
    init_logging(config.verbosity);

    let summary = convert(&config)?;
    if !summary.is_success() {
        bail!(
            "{} line(s) could not be matched (use --allow-unmatched to accept them)",
            summary.unmatched
        );
    }
    Ok(())
}
