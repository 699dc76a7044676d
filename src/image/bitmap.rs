// src/image/bitmap.rs

//! The bilevel raster type consumed and produced by the codec.
//!
//! A `Bitmap` is a `rows x cols` grid of `bool` pixels stored row-major in a
//! packed MSB-first bit vector. `true` is the "set" value (255 in an 8-bit
//! grayscale image), `false` the "unset" value (0). Dimensions never change
//! after construction; sub-bitmaps are copies produced by [`Bitmap::crop`].

use crate::utils::error::{CodecError, Result};
use bitvec::order::Msb0;
use bitvec::prelude::*;

/// A rectangular grid of two-valued pixels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bitmap {
    rows: usize,
    cols: usize,
    bits: BitVec<u8, Msb0>,
}

impl Bitmap {
    /// Creates a bitmap with every pixel set to `color`.
    pub fn filled(rows: usize, cols: usize, color: bool) -> Result<Self> {
        let area = Self::checked_area(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            bits: BitVec::repeat(color, area),
        })
    }

    /// Creates an all-unset bitmap.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, false)
    }

    /// Creates a bitmap from row-major pixels.
    pub fn from_pixels(rows: usize, cols: usize, pixels: &[bool]) -> Result<Self> {
        let area = Self::checked_area(rows, cols)?;
        if pixels.len() != area {
            return Err(CodecError::DimensionMismatch {
                expected: area,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            bits: pixels.iter().copied().collect(),
        })
    }

    /// Creates a bitmap by calling `f(row, col)` for each pixel.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> bool,
    {
        let area = Self::checked_area(rows, cols)?;
        let mut bits = BitVec::with_capacity(area);
        for row in 0..rows {
            for col in 0..cols {
                bits.push(f(row, col));
            }
        }
        Ok(Self { rows, cols, bits })
    }

    /// Creates a bitmap from an already-thresholded 8-bit grayscale buffer.
    ///
    /// Any non-zero byte is treated as set. No re-thresholding happens here.
    pub fn from_gray_bytes(rows: usize, cols: usize, data: &[u8]) -> Result<Self> {
        let area = Self::checked_area(rows, cols)?;
        if data.len() != area {
            return Err(CodecError::DimensionMismatch {
                expected: area,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            bits: data.iter().map(|&b| b != 0).collect(),
        })
    }

    /// Parses a text picture, one string per row: `#` or `1` is set, anything
    /// else is unset. All rows must have the same length.
    pub fn from_ascii(lines: &[&str]) -> Result<Self> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        let mut pixels = Vec::with_capacity(rows * cols);
        for line in lines {
            let before = pixels.len();
            pixels.extend(line.chars().map(|ch| ch == '#' || ch == '1'));
            if pixels.len() - before != cols {
                return Err(CodecError::DimensionMismatch {
                    expected: cols,
                    actual: pixels.len() - before,
                });
            }
        }
        Self::from_pixels(rows, cols, &pixels)
    }

    /// Converts back to an 8-bit buffer with 0/255 values.
    pub fn to_gray_bytes(&self) -> Vec<u8> {
        self.bits.iter().map(|b| if *b { 255 } else { 0 }).collect()
    }

    fn checked_area(rows: usize, cols: usize) -> Result<usize> {
        match rows.checked_mul(cols) {
            Some(area) if area < (isize::MAX as usize) / 8 => Ok(area),
            _ => Err(CodecError::TooLarge { rows, cols }),
        }
    }

    fn check_window(&self, top: usize, left: usize, rows: usize, cols: usize) -> Result<()> {
        let fits = |start: usize, len: usize, bound: usize| {
            start.checked_add(len).is_some_and(|end| end <= bound)
        };
        if fits(top, rows, self.rows) && fits(left, cols, self.cols) {
            return Ok(());
        }
        Err(CodecError::OutOfBounds {
            rows,
            cols,
            top,
            left,
            bound_rows: self.rows,
            bound_cols: self.cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of pixels, `rows * cols`.
    pub fn area(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Reads a pixel. Panics if `(row, col)` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.rows && col < self.cols);
        self.bits[row * self.cols + col]
    }

    /// Writes a pixel. Panics if `(row, col)` is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(row < self.rows && col < self.cols);
        self.bits.set(row * self.cols + col, value);
    }

    /// Reads the pixel at a row-major linear index.
    #[inline]
    pub fn get_index(&self, idx: usize) -> bool {
        self.bits[idx]
    }

    /// Writes the pixel at a row-major linear index.
    #[inline]
    pub fn set_index(&mut self, idx: usize, value: bool) {
        self.bits.set(idx, value);
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// The color covering the majority of pixels.
    ///
    /// Set wins only with a strict majority, so ties and empty bitmaps report
    /// unset.
    pub fn dominant_color(&self) -> bool {
        self.count_set() * 2 > self.area()
    }

    /// Copies the `rows x cols` window whose top-left corner is `(top, left)`.
    pub fn crop(&self, top: usize, left: usize, rows: usize, cols: usize) -> Result<Bitmap> {
        self.check_window(top, left, rows, cols)?;
        let mut bits = BitVec::with_capacity(rows * cols);
        for row in top..top + rows {
            let start = row * self.cols + left;
            bits.extend_from_bitslice(&self.bits[start..start + cols]);
        }
        Ok(Bitmap { rows, cols, bits })
    }

    /// Paints the pixels of `shape` that equal `ink` onto this bitmap with the
    /// shape's top-left corner at `(top, left)`. Pixels of the other color are
    /// left untouched.
    pub fn paint(&mut self, shape: &Bitmap, top: usize, left: usize, ink: bool) -> Result<()> {
        self.check_window(top, left, shape.rows, shape.cols)?;
        for row in 0..shape.rows {
            let src = &shape.bits[row * shape.cols..(row + 1) * shape.cols];
            let base = (top + row) * self.cols + left;
            for (col, pixel) in src.iter().by_vals().enumerate() {
                if pixel == ink {
                    self.bits.set(base + col, ink);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_creation() {
        let bm = Bitmap::new(10, 12).unwrap();
        assert_eq!(bm.dimensions(), (10, 12));
        assert_eq!(bm.area(), 120);
        assert_eq!(bm.count_set(), 0);
        assert!(!bm.dominant_color());
    }

    #[test]
    fn test_zero_sized_bitmaps() {
        let bm = Bitmap::new(0, 7).unwrap();
        assert!(bm.is_empty());
        assert!(!bm.dominant_color());
        assert!(Bitmap::from_pixels(3, 0, &[]).is_ok());
    }

    #[test]
    fn test_too_large() {
        assert!(matches!(
            Bitmap::new(usize::MAX, 2),
            Err(CodecError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_pixel_buffer_mismatch() {
        let err = Bitmap::from_pixels(2, 2, &[true, false, true]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_gray_bytes_roundtrip() {
        let data = [0u8, 255, 255, 0, 0, 255];
        let bm = Bitmap::from_gray_bytes(2, 3, &data).unwrap();
        assert!(bm.get(0, 1));
        assert!(!bm.get(1, 1));
        assert_eq!(bm.to_gray_bytes(), data);
    }

    #[test]
    fn test_dominant_color_majority() {
        let bm = Bitmap::from_ascii(&["##.", "#.#"]).unwrap();
        assert!(bm.dominant_color());
        // A 50/50 split keeps unset as the dominant color.
        let tie = Bitmap::from_ascii(&["#.", ".#"]).unwrap();
        assert!(!tie.dominant_color());
    }

    #[test]
    fn test_crop() {
        let bm = Bitmap::from_ascii(&["....", ".##.", ".#..", "...."]).unwrap();
        let sub = bm.crop(1, 1, 2, 2).unwrap();
        assert_eq!(sub, Bitmap::from_ascii(&["##", "#."]).unwrap());
        assert!(matches!(
            bm.crop(3, 3, 2, 2),
            Err(CodecError::OutOfBounds {
                top: 3,
                bound_rows: 4,
                ..
            })
        ));
        assert!(matches!(
            bm.crop(usize::MAX, 0, 2, 1),
            Err(CodecError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_paint_only_touches_ink() {
        let mut canvas = Bitmap::from_ascii(&["#...", "....", "...."]).unwrap();
        let shape = Bitmap::from_ascii(&[".#", "#."]).unwrap();
        canvas.paint(&shape, 0, 0, true).unwrap();
        // The pre-existing pixel under the shape's unset corner survives.
        assert_eq!(
            canvas,
            Bitmap::from_ascii(&["##..", "#...", "...."]).unwrap()
        );
        assert!(matches!(
            canvas.paint(&shape, 2, 0, true),
            Err(CodecError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_equality_includes_dimensions() {
        let a = Bitmap::new(2, 3).unwrap();
        let b = Bitmap::new(3, 2).unwrap();
        assert_ne!(a, b);
    }
}
