//! Binary trace codec.
//!
//! [`wire`] holds the byte-level primitives, [`record`] the descriptor-driven record engine,
//! [`tables`] the once-per-trace tables and [`stream`] ties them into whole-file readers and
//! writers.

pub mod record;
pub mod stream;
pub mod tables;
pub mod wire;

pub use record::RecordCodec;
pub use stream::{TraceReader, TraceWriter};
pub use tables::{
    CallCount, DatatypeSizes, Footer, Header, Keyvals, LabelTable, PerfLabels, TraceIndex,
    Trailer,
};
