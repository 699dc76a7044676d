//! Lossless compression for bilevel (two-color) images.
//!
//! An image is split into 8-connected components of its minority color. Each
//! distinct component bounding box is stored once and run-length coded along
//! whichever of four scan orders suits it best; placements refer back to the
//! shared shapes. The resulting integer stream is byte packed and finally
//! Huffman coded.
//!
//! # Quick Start
//!
//! ```
//! use bitonal_encoder::{Bitmap, Compressor};
//!
//! let image = Bitmap::from_ascii(&[
//!     "##....##",
//!     "#.....#.",
//!     "........",
//! ])?;
//!
//! let compressor = Compressor::new();
//! let bytes = compressor.compress(&image)?;
//! assert_eq!(compressor.decompress(&bytes)?, image);
//! # Ok::<(), bitonal_encoder::CodecError>(())
//! ```
//!
//! # Features
//!
//! - **Shape sharing**: identical components are stored once
//! - **Adaptive scanning**: row, column, spiral or zig-zag order per shape
//! - **Selectable packing**: whole-byte varints or minimal bit widths
//! - **Self-describing stream**: any [`Compressor`] decodes any output

// Core modules
pub mod encode;
pub mod image;
pub mod utils;

// Public API
pub use encode::{CompressParams, CompressionStats, Compressor, Packing, ScanOrder};

// Image types
pub use image::Bitmap;

// Error types
pub use utils::error::{CodecError, Result};

// Constants
pub const VERSION: &str = "0.1.0";

/// Compresses `bitmap` with default parameters.
pub fn compress(bitmap: &Bitmap) -> Result<Vec<u8>> {
    Compressor::new().compress(bitmap)
}

/// Decompresses a stream produced by [`compress`] or any [`Compressor`].
pub fn decompress(data: &[u8]) -> Result<Bitmap> {
    Compressor::new().decompress(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_top_level_roundtrip() {
        let bitmap = Bitmap::from_ascii(&[".#.", "###", ".#."]).unwrap();
        let bytes = compress(&bitmap).unwrap();
        assert_eq!(decompress(&bytes).unwrap(), bitmap);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decompress(&[0xFF, 0xFF, 0x01]).is_err());
        assert!(decompress(&[]).is_err());
    }
}
