//! mpitrace library - shared modules for the mpitrace and mpitrace-dump binaries.
//!
//! This library reads and writes binary MPI call traces and converts them to and from their
//! line-oriented ASCII rendering.
//!
//! # Modules
//!
//! - [`trace`] - Call record model and format constants
//! - [`schema`] - Per-kind field descriptor tables
//! - [`registry`] - Name/tag lookup over the record kinds
//! - [`codec`] - Binary record codec, auxiliary tables and stream reader/writer
//! - [`ascii`] - ASCII reconstruction and rendering
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mpitrace::{AsciiConverter, ConvertOptions, Registry};
//!
//! let registry = Arc::new(Registry::new()?);
//! let mut converter = AsciiConverter::new(
//!     registry,
//!     || std::fs::File::create("trace.bin"),
//!     ConvertOptions::default(),
//! )?;
//! converter.convert(std::io::stdin().lock())?;
//! let (_file, summary) = converter.finish()?;
//! println!("{} records", summary.records);
//! # Ok::<(), mpitrace::TraceError>(())
//! ```

pub mod ascii;
pub mod codec;
pub mod error;
pub mod mpitrace_core;
pub mod registry;
pub mod schema;
pub mod trace;

// Re-export for convenience
pub use ascii::{AsciiConverter, AsciiRenderer, ConversionSummary, ConvertOptions};
pub use codec::{Header, RecordCodec, TraceReader, TraceWriter, Trailer};
pub use error::{Result, TraceError};
pub use mpitrace_core::{convert, dump, init_logging, Config, DumpFormat};
pub use registry::Registry;
pub use trace::{CallRecord, Kind, Value};
