//! Bit-granular integer packing.
//!
//! Values are concatenated MSB-first, each in its minimal bit width (zero
//! takes one bit), and the final partial byte is padded with zero bits. The
//! widths follow as a run-length trailer built by the same backwards scan the
//! varint packer uses:
//!
//! ```text
//! meta = (width - 1) << 3 | (run - 1)     width 1..=32, run 1..=8
//! ```

use crate::utils::error::{CodecError, Result};
use bitvec::order::Msb0;
use bitvec::prelude::*;

/// Longest run of equal widths a single trailer byte describes.
pub const MAX_RUN: usize = 8;

/// Minimal number of bits needed for `value`, at least one.
pub fn bit_width(value: u32) -> usize {
    (32 - value.leading_zeros() as usize).max(1)
}

/// Packs `values` into a self-describing byte buffer.
pub fn pack(values: &[u32]) -> Vec<u8> {
    let mut stream: BitVec<u8, Msb0> = BitVec::with_capacity(values.len() * 8);
    let mut widths = Vec::with_capacity(values.len());

    for &value in values {
        let width = bit_width(value);
        for shift in (0..width).rev() {
            stream.push((value >> shift) & 1 == 1);
        }
        widths.push(width);
    }

    stream.set_uninitialized(false);
    let mut out = stream.into_vec();
    encode_widths(&widths, &mut out);
    out
}

fn encode_widths(widths: &[usize], out: &mut Vec<u8>) {
    let mut iter = widths.iter().rev();
    let Some(&first) = iter.next() else {
        return;
    };

    let mut prev = first;
    let mut run = 1usize;
    for &width in iter {
        if width == prev && run < MAX_RUN {
            run += 1;
        } else {
            out.push((((prev - 1) << 3) | (run - 1)) as u8);
            prev = width;
            run = 1;
        }
    }
    out.push((((prev - 1) << 3) | (run - 1)) as u8);
}

/// Reverses [`pack`].
///
/// Fails with a format error when the declared bit total does not occupy
/// exactly the bytes in front of the trailer.
pub fn unpack(data: &[u8]) -> Result<Vec<u32>> {
    let mut remaining = data.len();
    let mut declared_bits = 0usize;
    let mut widths = Vec::new();

    while remaining > declared_bits.div_ceil(8) {
        remaining -= 1;
        let meta = data[remaining];
        let width = usize::from(meta >> 3) + 1;
        let run = usize::from(meta & 0x07) + 1;
        declared_bits += width * run;
        widths.extend(std::iter::repeat_n(width, run));
    }

    if remaining != declared_bits.div_ceil(8) {
        return Err(CodecError::format(format!(
            "bit trailer declares {} bits but {} bytes remain",
            declared_bits, remaining
        )));
    }

    let stream = data[..remaining].view_bits::<Msb0>();
    let mut values = Vec::with_capacity(widths.len());
    let mut pos = 0usize;
    for width in widths {
        let value = stream[pos..pos + width]
            .iter()
            .by_vals()
            .fold(0u32, |acc, bit| (acc << 1) | u32::from(bit));
        values.push(value);
        pos += width;
    }
    Ok(values)
}
