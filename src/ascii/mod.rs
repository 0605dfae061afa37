//! The human-readable trace rendering: reconstruction into binary and rendering out of it.

mod lines;
mod literal;
pub mod patterns;
pub mod reconstruct;
pub mod render;

pub use lines::LineSource;
pub use patterns::{LinePatterns, LineShape};
pub use reconstruct::{AsciiConverter, ConversionSummary, ConvertOptions};
pub use render::AsciiRenderer;
