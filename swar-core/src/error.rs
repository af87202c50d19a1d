//! Error types for the swar pipeline.
//!
//! Per-tick processing never fails: silence, out-of-range pitch and degenerate
//! buffers all come back as "no pitch". Only configuration can be rejected.

use thiserror::Error;

/// Errors raised at the configuration boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwarError {
    /// Scale root outside the 12-tone chromatic range.
    #[error("scale root {0} is outside the chromatic range 0..=11")]
    InvalidScaleRoot(i32),

    /// A note name that is not one of the twelve chromatic names.
    #[error("unknown note name: {0:?}")]
    UnknownNoteName(String),

    /// Tuning parameters that contradict each other.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SwarError>;
