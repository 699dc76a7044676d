//! Pixel traversal orders for run-length coding.
//!
//! Each order visits every cell of a `rows x cols` grid exactly once. Runs are
//! counted along the visiting sequence, so an order that follows a shape's
//! structure yields fewer, longer runs.

/// The four traversal geometries. The discriminant is the 2-bit tag stored
/// in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanOrder {
    /// Rows top to bottom, alternating left-to-right and right-to-left.
    RowMajor = 0,
    /// Columns left to right, alternating top-to-bottom and bottom-to-top.
    ColumnMajor = 1,
    /// Clockwise inward spiral starting at the top-right corner heading down.
    Spiral = 2,
    /// Anti-diagonals from the top-left, alternating up-right and down-left.
    ZigZag = 3,
}

impl ScanOrder {
    /// All orders in tie-break priority.
    pub const ALL: [ScanOrder; 4] = [
        ScanOrder::RowMajor,
        ScanOrder::ColumnMajor,
        ScanOrder::Spiral,
        ScanOrder::ZigZag,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ScanOrder::RowMajor),
            1 => Some(ScanOrder::ColumnMajor),
            2 => Some(ScanOrder::Spiral),
            3 => Some(ScanOrder::ZigZag),
            _ => None,
        }
    }

    /// Row-major linear indices (`row * cols + col`) in visiting order.
    pub fn positions(self, rows: usize, cols: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(rows * cols);
        if rows == 0 || cols == 0 {
            return out;
        }
        match self {
            ScanOrder::RowMajor => row_major(rows, cols, &mut out),
            ScanOrder::ColumnMajor => column_major(rows, cols, &mut out),
            ScanOrder::Spiral => spiral(rows, cols, &mut out),
            ScanOrder::ZigZag => zig_zag(rows, cols, &mut out),
        }
        out
    }
}

fn row_major(rows: usize, cols: usize, out: &mut Vec<usize>) {
    for row in 0..rows {
        let base = row * cols;
        if row % 2 == 0 {
            out.extend((0..cols).map(|col| base + col));
        } else {
            out.extend((0..cols).rev().map(|col| base + col));
        }
    }
}

fn column_major(rows: usize, cols: usize, out: &mut Vec<usize>) {
    for col in 0..cols {
        if col % 2 == 0 {
            out.extend((0..rows).map(|row| row * cols + col));
        } else {
            out.extend((0..rows).rev().map(|row| row * cols + col));
        }
    }
}

fn spiral(rows: usize, cols: usize, out: &mut Vec<usize>) {
    // Inclusive bounds of the rectangle not yet visited.
    let (mut top, mut bottom) = (0isize, rows as isize - 1);
    let (mut left, mut right) = (0isize, cols as isize - 1);
    let at = |row: isize, col: isize| row as usize * cols + col as usize;

    while top <= bottom && left <= right {
        for row in top..=bottom {
            out.push(at(row, right));
        }
        right -= 1;

        if left <= right {
            for col in (left..=right).rev() {
                out.push(at(bottom, col));
            }
            bottom -= 1;
        }

        if top <= bottom && left <= right {
            for row in (top..=bottom).rev() {
                out.push(at(row, left));
            }
            left += 1;
        }

        if top <= bottom && left <= right {
            for col in left..=right {
                out.push(at(top, col));
            }
            top += 1;
        }
    }
}

fn zig_zag(rows: usize, cols: usize, out: &mut Vec<usize>) {
    for diag in 0..rows + cols - 1 {
        let first_row = diag.saturating_sub(cols - 1);
        let last_row = diag.min(rows - 1);
        if diag % 2 == 0 {
            for row in (first_row..=last_row).rev() {
                out.push(row * cols + (diag - row));
            }
        } else {
            for row in first_row..=last_row {
                out.push(row * cols + (diag - row));
            }
        }
    }
}
