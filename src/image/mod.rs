//! Image types consumed and produced by the codec.

pub mod bitmap;

pub use bitmap::Bitmap;
