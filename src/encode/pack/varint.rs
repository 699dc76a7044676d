//! Byte-granular integer packing.
//!
//! Each value is written little-endian in the fewest whole bytes that hold it
//! (zero still takes one byte). The sequence of byte widths is appended as a
//! run-length trailer, scanned from the last value backwards:
//!
//! ```text
//! [value bytes ...][meta for last run] ... [meta for first run]
//! meta = (width - 1) << 6 | (run - 1)     width 1..=4, run 1..=63
//! ```
//!
//! Unpacking pops trailer bytes from the end until the declared widths cover
//! everything left in front of them.

use crate::utils::error::{CodecError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Longest run of equal widths a single trailer byte describes.
pub const MAX_RUN: usize = 63;

/// Widest value in bytes; the trailer reserves two bits for `width - 1`.
pub const MAX_WIDTH: usize = 4;

/// Minimal number of bytes needed for `value`, at least one.
pub fn byte_width(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

/// Packs `values` into a self-describing byte buffer.
pub fn pack(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    let mut widths = Vec::with_capacity(values.len());
    let mut scratch = [0u8; MAX_WIDTH];

    for &value in values {
        let width = byte_width(value);
        LittleEndian::write_uint(&mut scratch, u64::from(value), width);
        out.extend_from_slice(&scratch[..width]);
        widths.push(width);
    }

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
            out.push(meta_byte(prev, run));
            prev = width;
            run = 1;
        }
    }
    out.push(meta_byte(prev, run));
}

#[inline]
fn meta_byte(width: usize, run: usize) -> u8 {
    (((width - 1) << 6) | (run - 1)) as u8
}

/// Reverses [`pack`].
///
/// Fails with a format error when the trailer declares more or fewer value
/// bytes than the buffer holds.
pub fn unpack(data: &[u8]) -> Result<Vec<u32>> {
    let mut remaining = data.len();
    let mut declared = 0usize;
    let mut widths = Vec::new();

    while remaining > declared {
        remaining -= 1;
        let meta = data[remaining];
        let width = usize::from(meta >> 6) + 1;
        let run = usize::from(meta & 0x3f) + 1;
        declared += width * run;
        widths.extend(std::iter::repeat_n(width, run));
    }

    if remaining != declared {
        return Err(CodecError::format(format!(
            "varint trailer declares {} value bytes but {} remain",
            declared, remaining
        )));
    }

    let mut values = Vec::with_capacity(widths.len());
    let mut pos = 0usize;
    for width in widths {
        values.push(LittleEndian::read_uint(&data[pos..pos + width], width) as u32);
        pos += width;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_byte_width() {
        assert_eq!(byte_width(0), 1);
        assert_eq!(byte_width(255), 1);
        assert_eq!(byte_width(256), 2);
        assert_eq!(byte_width(0xffff), 2);
        assert_eq!(byte_width(0x1_0000), 3);
        assert_eq!(byte_width(u32::MAX), 4);
    }

    #[test]
    fn test_known_layout() {
        // 1 byte, 2 bytes, 2 bytes: trailer describes the two-byte run first.
        let packed = pack(&[7, 0x0102, 0x0304]);
        assert_eq!(
            packed,
            vec![7, 0x02, 0x01, 0x04, 0x03, (1 << 6) | 1, 0]
        );
        assert_eq!(unpack(&packed).unwrap(), vec![7, 0x0102, 0x0304]);
    }

    #[test]
    fn test_empty() {
        assert!(pack(&[]).is_empty());
        assert!(unpack(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_values() {
        let values = vec![0, 0, 0];
        let packed = pack(&values);
        assert_eq!(packed, vec![0, 0, 0, 2]);
        assert_eq!(unpack(&packed).unwrap(), values);
    }

    #[test]
    fn test_long_runs_split_at_limit() {
        let values = vec![1u32; MAX_RUN * 2 + 5];
        let packed = pack(&values);
        // Three trailer bytes: 63 + 63 + 5.
        assert_eq!(packed.len(), values.len() + 3);
        assert_eq!(unpack(&packed).unwrap(), values);
    }

    #[test]
    fn test_truncated_input_fails() {
        let mut packed = pack(&[1000, 2000, 3]);
        packed.remove(0);
        assert!(matches!(unpack(&packed), Err(CodecError::Format(_))));
    }

    #[test]
    fn test_overdeclared_trailer_fails() {
        // One data byte, trailer claims a run of two one-byte values.
        assert!(matches!(unpack(&[5, 1]), Err(CodecError::Format(_))));
    }

    proptest! {
        #[test]
        fn test_roundtrip(values in proptest::collection::vec(any::<u32>(), 0..300)) {
            prop_assert_eq!(unpack(&pack(&values)).unwrap(), values);
        }

        #[test]
        fn test_roundtrip_small_values(values in proptest::collection::vec(0u32..300, 0..300)) {
            prop_assert_eq!(unpack(&pack(&values)).unwrap(), values);
        }
    }
}
