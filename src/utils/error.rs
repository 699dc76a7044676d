// src/utils/error.rs

use thiserror::Error;

/// The primary error type for every stage of the compression pipeline.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A decode-time structural invariant was violated: metadata that does not
    /// add up to the buffer length, a truncated frequency table, a bad trailer.
    #[error("Format error: {0}")]
    Format(String),

    /// An encode-time limit was exceeded. No partial output is produced.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Run lengths did not exactly fill a shape while decoding.
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// A pixel buffer does not match the requested bitmap dimensions.
    #[error("Dimension mismatch: expected {expected} pixels, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The requested dimensions cannot be allocated or addressed.
    #[error("Bitmap dimensions ({rows}x{cols}) are too large")]
    TooLarge { rows: usize, cols: usize },

    /// A crop or paint window reaches past the edge of a bitmap.
    #[error("Window {rows}x{cols} at ({top}, {left}) exceeds {bound_rows}x{bound_cols} bitmap")]
    OutOfBounds {
        rows: usize,
        cols: usize,
        top: usize,
        left: usize,
        bound_rows: usize,
        bound_cols: usize,
    },

    /// An error from the reader/writer handed to the stream helpers.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        CodecError::Format(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        CodecError::Encoding(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        CodecError::CorruptData(msg.into())
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
