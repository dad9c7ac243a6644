//! Error types for exrjpg-core operations.
//!
//! Covers buffer construction and color space parsing. Higher level crates
//! wrap these into their own error enums.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by core buffer and selector types.
#[derive(Debug, Error)]
pub enum Error {
    /// Buffer length does not match `width * height * channels`.
    #[error("buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSize {
        /// Samples required by the dimensions.
        expected: usize,
        /// Samples actually provided.
        actual: usize,
    },

    /// Zero width, height or channel count.
    #[error("invalid dimensions: {width}x{height}x{channels}")]
    InvalidDimensions {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Channel count.
        channels: usize,
    },

    /// Fewer channels than an operation needs.
    #[error("need at least {required} channels, image has {actual}")]
    ChannelCount {
        /// Channels required.
        required: usize,
        /// Channels present.
        actual: usize,
    },

    /// Unknown color space label.
    #[error("unknown {kind} color space '{value}' (expected one of: {expected})")]
    UnknownColorSpace {
        /// "input" or "output".
        kind: &'static str,
        /// The rejected label.
        value: String,
        /// Accepted labels.
        expected: &'static str,
    },
}
