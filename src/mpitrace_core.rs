//! Runtime configuration and the top-level conversion entry points used by both binaries.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::ascii::{AsciiConverter, AsciiRenderer, ConversionSummary, ConvertOptions};
use crate::codec::TraceReader;
use crate::registry::Registry;

/// Configuration for an ASCII to binary conversion.
/// Holds the runtime options `convert()` needs, separated from the CLI parsing concerns.
#[derive(Debug)]
pub struct Config {
    /// Verbosity level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
    pub verbosity: u8,
    /// ASCII inputs, converted in order into one trace (empty = stdin)
    pub inputs: Vec<PathBuf>,
    /// Binary trace to write
    pub output: PathBuf,
    /// Do not fail the run because of unmatched lines
    pub allow_unmatched: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbosity: 0,
            inputs: Vec::new(),
            output: PathBuf::from("trace.bin"),
            allow_unmatched: false,
        }
    }
}

impl Config {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            allow_unmatched: self.allow_unmatched,
        }
    }
}

/// Output format of the dump tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DumpFormat {
    #[default]
    Ascii,
    Json,
}

/// Default log filter for a `-v` count.
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Send logs to stderr. `RUST_LOG`, when set, wins over the verbosity ladder.
pub fn init_logging(verbosity: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbosity)));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Convert the configured ASCII inputs into one binary trace.
///
/// The output file is created only once there is something to write. The returned summary
/// counts unmatched lines; deciding whether they fail the run is up to the caller.
pub fn convert(config: &Config) -> Result<ConversionSummary> {
    let registry = Arc::new(Registry::new()?);
    let output = config.output.clone();
    let open = move || -> io::Result<BufWriter<File>> {
        info!("creating {}", output.display());
        File::create(&output).map(BufWriter::new)
    };
    let mut converter = AsciiConverter::new(registry, open, config.convert_options())?;

    if config.inputs.is_empty() {
        info!("reading standard input");
        converter
            .convert(io::stdin().lock())
            .context("failed to convert standard input")?;
    }
    for path in &config.inputs {
        info!("reading {}", path.display());
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        converter
            .convert(BufReader::new(file))
            .with_context(|| format!("failed to convert {}", path.display()))?;
    }

    let (mut sink, summary) = converter
        .finish()
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    sink.flush()?;
    info!(
        "converted {} records from {} lines ({} unmatched)",
        summary.records, summary.lines, summary.unmatched
    );
    Ok(summary)
}

/// Render a binary trace to `out`.
pub fn dump<W: Write>(input: &Path, format: DumpFormat, out: &mut W) -> Result<()> {
    let registry = Arc::new(Registry::new()?);
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let reader = TraceReader::open(BufReader::new(file), registry.clone())
        .with_context(|| format!("failed to read header of {}", input.display()))?;
    let renderer = AsciiRenderer::new(registry);
    let rendered = match format {
        DumpFormat::Ascii => renderer.render_stream(reader, out),
        DumpFormat::Json => renderer.json_stream(reader, out),
    };
    rendered.with_context(|| format!("failed to dump {}", input.display()))?;
    out.flush()?;
    Ok(())
}
