//! Run-length coding of shape bitmaps.
//!
//! A shape serializes as `[rows, cols, run0, run1, ...]`. Runs alternate
//! between pixels that match the dominant color and pixels that don't,
//! starting with a dominant run, so `run0` is zero whenever the first visited
//! pixel is block-colored. Every shape emits at least one run.

use super::scan::ScanOrder;
use crate::encode::stream::IntReader;
use crate::image::Bitmap;
use crate::utils::error::{CodecError, Result};
use crate::utils::log::trace;

/// Encodes `shape` along a fixed scan order.
pub fn encode_with(shape: &Bitmap, order: ScanOrder, dominant: bool) -> Vec<u32> {
    let mut out = vec![shape.rows() as u32, shape.cols() as u32];

    let mut prev_is_dominant = true;
    let mut run = 0u32;
    for pos in order.positions(shape.rows(), shape.cols()) {
        let is_dominant = shape.get_index(pos) == dominant;
        if is_dominant == prev_is_dominant {
            run += 1;
        } else {
            out.push(run);
            run = 1;
            prev_is_dominant = is_dominant;
        }
    }
    out.push(run);
    out
}

/// Encodes `shape` along whichever scan order yields the fewest integers.
/// Ties go to the earlier order in [`ScanOrder::ALL`].
pub fn encode(shape: &Bitmap, dominant: bool) -> (ScanOrder, Vec<u32>) {
    let mut order = ScanOrder::ALL[0];
    let mut values = encode_with(shape, order, dominant);
    for &candidate in &ScanOrder::ALL[1..] {
        let encoded = encode_with(shape, candidate, dominant);
        if encoded.len() < values.len() {
            order = candidate;
            values = encoded;
        }
    }
    trace!(
        rows = shape.rows(),
        cols = shape.cols(),
        order = ?order,
        len = values.len(),
        "shape encoded"
    );
    (order, values)
}

/// Decodes one shape starting at the reader's position, leaving the reader
/// just past the shape's last run.
pub fn decode(reader: &mut IntReader<'_>, order: ScanOrder, dominant: bool) -> Result<Bitmap> {
    let rows = next(reader, "shape rows")? as usize;
    let cols = next(reader, "shape cols")? as usize;
    let mut shape = Bitmap::filled(rows, cols, dominant)?;
    let area = shape.area();
    let positions = order.positions(rows, cols);

    let mut filled = 0usize;
    let mut paint_dominant = true;
    loop {
        let run = next(reader, "shape run")? as usize;
        let end = filled
            .checked_add(run)
            .filter(|&end| end <= area)
            .ok_or_else(|| {
                CodecError::corrupt(format!(
                    "runs overflow {}x{} shape ({} + {} > {})",
                    rows, cols, filled, run, area
                ))
            })?;
        if !paint_dominant {
            for &pos in &positions[filled..end] {
                shape.set_index(pos, !dominant);
            }
        }
        filled = end;
        paint_dominant = !paint_dominant;
        if filled == area {
            return Ok(shape);
        }
    }
}

fn next(reader: &mut IntReader<'_>, what: &str) -> Result<u32> {
    reader.next_value().ok_or_else(|| {
        CodecError::corrupt(format!(
            "stream ended at {} while reading {}",
            reader.position(),
            what
        ))
    })
}
