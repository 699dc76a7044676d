//! Encoding stages, lowest level first:
//!
//! 1. **Packing** (`pack`) - integer stream to bytes
//! 2. **Shape coding** (`shape`) - run-length coding along four scan orders
//! 3. **Segmentation** (`segment`) - connected components and the shape table
//! 4. **Entropy coding** (`huffman`) - static Huffman over the packed bytes
//! 5. **Pipeline** (`compressor`) - ties the stages together

pub mod compressor;
pub mod huffman;
pub mod pack;
pub mod segment;
pub mod shape;
pub mod stream;

// Re-export commonly used encoding functionality
pub use compressor::{CompressParams, CompressionStats, Compressor};
pub use pack::Packing;
pub use segment::{ImageBlock, Segmentation, segment};
pub use shape::ScanOrder;
