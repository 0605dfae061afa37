//! mpitrace-dump: print a binary MPI trace as ASCII or JSON lines.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use mpitrace::{dump, init_logging, DumpFormat};

#[derive(Parser)]
#[command(name = "mpitrace-dump")]
#[command(about = "Render binary MPI traces")]
#[command(version)]
struct Cli {
    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = DumpFormat::Ascii)]
    format: DumpFormat,
    /// Binary trace to read
    input: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    dump(&cli.input, cli.format, &mut out)
}
