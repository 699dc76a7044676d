// src/encode/huffman.rs

//! Static Huffman coding of byte streams.
//!
//! The frequency table travels with the data, so the decoder rebuilds the
//! exact tree the encoder used:
//!
//! ```text
//! [table length: u16 LE][varint-packed 256 frequencies][codes, MSB first][pad bits]
//! ```
//!
//! The final byte counts the zero bits that pad the code stream to a byte
//! boundary (0..=7). An empty input encodes to an empty output and back.

use crate::encode::pack::varint;
use crate::utils::error::{CodecError, Result};
use crate::utils::log::debug;
use bitvec::order::Msb0;
use bitvec::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

const SYMBOLS: usize = 256;

/// Longest code the bit accumulator can hold.
const MAX_CODE_LEN: u8 = 64;

/// A code: the low `len` bits of `bits`, most significant first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Codeword {
    pub bits: u64,
    pub len: u8,
}

/// Node in the arena-allocated Huffman tree. Children are arena indices.
#[derive(Debug, Clone, Copy)]
enum HuffmanNode {
    Leaf { symbol: u8 },
    Internal { left: usize, right: usize },
}

/// Forward and inverse code tables derived from a frequency table.
#[derive(Debug)]
pub struct HuffmanTable {
    codes: Vec<Option<Codeword>>,
    symbols: HashMap<Codeword, u8>,
    max_len: u8,
}

impl HuffmanTable {
    /// Builds the tree for `frequencies` and derives its codes.
    ///
    /// Nodes leave the queue ordered by `(frequency, creation order)`: leaves
    /// are created in ascending symbol order, each merged node after them.
    /// The first node popped becomes the left (`0`) child. A lone symbol gets
    /// the one-bit code `0`.
    pub fn from_frequencies(frequencies: &[u32]) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();

        for (symbol, &freq) in frequencies.iter().enumerate().take(SYMBOLS) {
            if freq > 0 {
                heap.push(Reverse((u64::from(freq), nodes.len())));
                nodes.push(HuffmanNode::Leaf {
                    symbol: symbol as u8,
                });
            }
        }

        while let (Some(Reverse((lf, left))), Some(Reverse((rf, right)))) = (heap.pop(), heap.pop())
        {
            heap.push(Reverse((lf + rf, nodes.len())));
            nodes.push(HuffmanNode::Internal { left, right });
        }

        let mut table = Self {
            codes: vec![None; SYMBOLS],
            symbols: HashMap::new(),
            max_len: 0,
        };
        if let Some(root) = nodes.len().checked_sub(1) {
            table.assign_codes(&nodes, root)?;
        }
        Ok(table)
    }

    fn assign_codes(&mut self, nodes: &[HuffmanNode], root: usize) -> Result<()> {
        if let HuffmanNode::Leaf { symbol } = nodes[root] {
            self.insert(symbol, Codeword { bits: 0, len: 1 });
            return Ok(());
        }

        let mut stack = vec![(root, Codeword { bits: 0, len: 0 })];
        while let Some((idx, code)) = stack.pop() {
            match nodes[idx] {
                HuffmanNode::Leaf { symbol } => self.insert(symbol, code),
                HuffmanNode::Internal { left, right } => {
                    if code.len == MAX_CODE_LEN {
                        return Err(CodecError::encoding(format!(
                            "Huffman code exceeds {} bits",
                            MAX_CODE_LEN
                        )));
                    }
                    let len = code.len + 1;
                    stack.push((right, Codeword { bits: (code.bits << 1) | 1, len }));
                    stack.push((left, Codeword { bits: code.bits << 1, len }));
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, symbol: u8, code: Codeword) {
        self.codes[usize::from(symbol)] = Some(code);
        self.symbols.insert(code, symbol);
        self.max_len = self.max_len.max(code.len);
    }

    /// Code assigned to `symbol`, if it occurs.
    pub fn code(&self, symbol: u8) -> Option<Codeword> {
        self.codes[usize::from(symbol)]
    }

    /// Symbol whose code is exactly `code`.
    pub fn symbol(&self, code: Codeword) -> Option<u8> {
        self.symbols.get(&code).copied()
    }
}

/// Compresses `data`.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut frequencies = [0u32; SYMBOLS];
    for &byte in data {
        let slot = &mut frequencies[usize::from(byte)];
        *slot = slot.checked_add(1).ok_or_else(|| {
            CodecError::encoding(format!("symbol {:#04x} occurs more than u32::MAX times", byte))
        })?;
    }

    let table_bytes = varint::pack(&frequencies);
    let table_len = u16::try_from(table_bytes.len()).map_err(|_| {
        CodecError::encoding(format!(
            "frequency table of {} bytes exceeds {}",
            table_bytes.len(),
            u16::MAX
        ))
    })?;

    let table = HuffmanTable::from_frequencies(&frequencies)?;
    let mut stream: BitVec<u8, Msb0> = BitVec::with_capacity(data.len() * 8);
    for &byte in data {
        let code = table.code(byte).ok_or_else(|| {
            CodecError::encoding(format!("no code for symbol {:#04x}", byte))
        })?;
        for shift in (0..code.len).rev() {
            stream.push((code.bits >> shift) & 1 == 1);
        }
    }
    let payload_bits = stream.len();
    let padding = (8 - payload_bits % 8) % 8;

    let mut out = Vec::with_capacity(2 + table_bytes.len() + payload_bits / 8 + 2);
    out.write_u16::<LittleEndian>(table_len)?;
    out.extend_from_slice(&table_bytes);
    stream.set_uninitialized(false);
    out.extend_from_slice(stream.as_raw_slice());
    out.write_u8(padding as u8)?;

    debug!(
        input = data.len(),
        table = table_bytes.len(),
        payload_bits,
        output = out.len(),
        "huffman encoded"
    );
    Ok(out)
}

/// Reverses [`encode`].
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut rest = data;
    let table_len = usize::from(
        rest.read_u16::<LittleEndian>()
            .map_err(|_| CodecError::format("truncated frequency table length"))?,
    );
    if rest.len() <= table_len {
        return Err(CodecError::format(format!(
            "frequency table of {} bytes and trailer do not fit in {} bytes",
            table_len,
            rest.len()
        )));
    }
    let (table_bytes, rest) = rest.split_at(table_len);
    let (payload, trailer) = rest.split_at(rest.len() - 1);

    let frequencies = varint::unpack(table_bytes)?;
    if frequencies.len() != SYMBOLS {
        return Err(CodecError::format(format!(
            "frequency table holds {} entries, expected {}",
            frequencies.len(),
            SYMBOLS
        )));
    }
    let expected: u64 = frequencies.iter().map(|&f| u64::from(f)).sum();
    if expected == 0 {
        return Err(CodecError::format("frequency table is empty"));
    }

    let padding = usize::from(trailer[0]);
    if padding > 7 || padding > payload.len() * 8 {
        return Err(CodecError::format(format!(
            "invalid padding count {} for {} payload bytes",
            padding,
            payload.len()
        )));
    }
    let bits = payload.view_bits::<Msb0>();
    let bits = &bits[..bits.len() - padding];

    let table = HuffmanTable::from_frequencies(&frequencies)?;
    let capacity = usize::try_from(expected).unwrap_or(usize::MAX).min(bits.len());
    let mut out = Vec::with_capacity(capacity);
    let mut code = Codeword { bits: 0, len: 0 };
    for bit in bits.iter().by_vals() {
        code.bits = (code.bits << 1) | u64::from(bit);
        code.len += 1;
        if let Some(symbol) = table.symbol(code) {
            out.push(symbol);
            code = Codeword { bits: 0, len: 0 };
        } else if code.len >= table.max_len {
            return Err(CodecError::format(format!(
                "bit pattern at offset {} matches no code",
                out.len()
            )));
        }
    }
    if code.len != 0 {
        return Err(CodecError::format(format!(
            "{} trailing bits do not form a code",
            code.len
        )));
    }
    let mut decoded = [0u32; SYMBOLS];
    for &symbol in &out {
        decoded[usize::from(symbol)] += 1;
    }
    if decoded[..] != frequencies[..] {
        return Err(CodecError::format(format!(
            "decoded {} symbols that disagree with the frequency table ({} expected)",
            out.len(),
            expected
        )));
    }

    debug!(input = data.len(), output = out.len(), "huffman decoded");
    Ok(out)
}
