//! Cursor over the decoded integer stream.

/// Reads `u32` values front to back, tracking how far decoding has got.
#[derive(Debug, Clone)]
pub struct IntReader<'a> {
    values: &'a [u32],
    pos: usize,
}

impl<'a> IntReader<'a> {
    pub fn new(values: &'a [u32]) -> Self {
        Self { values, pos: 0 }
    }

    /// Next value, or `None` once the stream is exhausted.
    #[inline]
    pub fn next_value(&mut self) -> Option<u32> {
        let value = self.values.get(self.pos).copied()?;
        self.pos += 1;
        Some(value)
    }

    /// Value `ahead` positions past the next one, without consuming anything.
    pub fn peek(&self, ahead: usize) -> Option<u32> {
        self.values.get(self.pos + ahead).copied()
    }

    /// Index of the next value to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.pos
    }
}
