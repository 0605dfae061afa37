//! Trace data types shared by the binary and ASCII paths.
//!
//! # Module Organization
//!
//! - [`models`]: call records, the common envelope, statuses, handles and field values
//! - [`constants`]: magic, format version and legacy thresholds

pub mod constants;
pub mod models;

pub use models::*;
