//! Connected-component segmentation of a bilevel image.
//!
//! Every 8-connected region of block-colored pixels (the color that is not
//! dominant) becomes one placement. The placement refers to the region's
//! bounding box, cropped from the image as-is, so a box may also contain
//! pixels of neighbouring components. Identical boxes share one entry in the
//! shape table.
//!
//! ## Coordinate System
//!
//! - Top-down: row 0 is the top of the image.
//! - A placement's `start_offset` is the linear index `cols * top + left` of
//!   its bounding box's top-left corner.

use crate::image::Bitmap;
use crate::utils::error::Result;
use crate::utils::log::debug;
use bitvec::prelude::*;
use std::collections::HashMap;

// ─── Placement ──────────────────────────────────────────────────────────────

/// One occurrence of a shape in the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageBlock {
    /// Linear pixel index of the bounding box's top-left corner.
    pub start_offset: usize,
    /// Index into the shape table.
    pub shape_index: usize,
}

impl ImageBlock {
    /// `(row, col)` of the top-left corner in an image `cols` pixels wide.
    pub fn position(&self, cols: usize) -> (usize, usize) {
        (self.start_offset / cols, self.start_offset % cols)
    }
}

// ─── Bounding box ───────────────────────────────────────────────────────────

/// Inclusive pixel bounds grown while a component is flooded.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    min_row: usize,
    min_col: usize,
    max_row: usize,
    max_col: usize,
}

impl Bounds {
    fn at(row: usize, col: usize) -> Self {
        Self {
            min_row: row,
            min_col: col,
            max_row: row,
            max_col: col,
        }
    }

    fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }
}

// ─── Segmentation result ────────────────────────────────────────────────────

/// Shape table plus placements, as consumed by the stream encoder.
#[derive(Clone, Debug, Default)]
pub struct Segmentation {
    /// Distinct bounding-box bitmaps in order of first appearance.
    pub shapes: Vec<Bitmap>,
    /// Placements sorted by `(start_offset, shape_index)`.
    pub blocks: Vec<ImageBlock>,
    /// For each shape, the ascending indices into `blocks` that reference it.
    pub shape_blocks: Vec<Vec<usize>>,
}

impl Segmentation {
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn placement_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Splits `image` into deduplicated component shapes and their placements.
///
/// Pixels equal to `dominant` are background. Components are discovered in
/// row-major order of their first pixel.
pub fn segment(image: &Bitmap, dominant: bool) -> Result<Segmentation> {
    let (rows, cols) = image.dimensions();
    let mut visited: BitVec = BitVec::repeat(false, image.area());
    let mut stack = Vec::new();

    let mut shapes: Vec<Bitmap> = Vec::new();
    let mut index: HashMap<Bitmap, usize> = HashMap::new();
    let mut blocks = Vec::new();

    for start in 0..image.area() {
        if visited[start] || image.get_index(start) == dominant {
            continue;
        }

        let bounds = flood(image, dominant, start, &mut visited, &mut stack);
        let shape = image.crop(bounds.min_row, bounds.min_col, bounds.height(), bounds.width())?;
        let shape_index = match index.get(&shape) {
            Some(&existing) => existing,
            None => {
                let next = shapes.len();
                index.insert(shape.clone(), next);
                shapes.push(shape);
                next
            }
        };
        blocks.push(ImageBlock {
            start_offset: cols * bounds.min_row + bounds.min_col,
            shape_index,
        });
    }

    blocks.sort_unstable();

    let mut shape_blocks = vec![Vec::new(); shapes.len()];
    for (block_index, block) in blocks.iter().enumerate() {
        shape_blocks[block.shape_index].push(block_index);
    }

    debug!(
        rows,
        cols,
        components = blocks.len(),
        unique_shapes = shapes.len(),
        "segmented image"
    );

    Ok(Segmentation {
        shapes,
        blocks,
        shape_blocks,
    })
}

/// Marks the 8-connected component containing `start` as visited and
/// returns its bounds. `stack` is scratch space reused across components.
fn flood(
    image: &Bitmap,
    dominant: bool,
    start: usize,
    visited: &mut BitVec,
    stack: &mut Vec<usize>,
) -> Bounds {
    let (rows, cols) = image.dimensions();
    let mut bounds = Bounds::at(start / cols, start % cols);

    visited.set(start, true);
    stack.clear();
    stack.push(start);

    while let Some(idx) = stack.pop() {
        let (row, col) = (idx / cols, idx % cols);
        bounds.include(row, col);

        for next_row in row.saturating_sub(1)..=(row + 1).min(rows - 1) {
            for next_col in col.saturating_sub(1)..=(col + 1).min(cols - 1) {
                let next = next_row * cols + next_col;
                if !visited[next] && image.get_index(next) != dominant {
                    visited.set(next, true);
                    stack.push(next);
                }
            }
        }
    }

    bounds
}
