//! Shape serialization: scan orders and the run-length codec built on them.

pub mod codec;
pub mod scan;

pub use scan::ScanOrder;
