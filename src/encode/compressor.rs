//! The compression pipeline.
//!
//! Compression runs segment, shape coding, integer packing and Huffman coding
//! in that order; decompression undoes them in reverse. The integer stream
//! between the stages is laid out as
//!
//! ```text
//! rows, cols, shape_count,
//! tag words          ceil(shape_count / 2) words, two 2-bit scan tags each
//! per shape          rows, cols, runs..., ref_count, block index deltas...
//! per placement      start offset delta
//! ```
//!
//! and is preceded, after packing, by one configuration byte: bit 0 holds the
//! dominant color, bit 1 the packing.

use crate::encode::huffman;
use crate::encode::pack::Packing;
use crate::encode::segment::{Segmentation, segment};
use crate::encode::shape::{ScanOrder, codec};
use crate::encode::stream::IntReader;
use crate::image::Bitmap;
use crate::utils::error::{CodecError, Result};
use crate::utils::log::debug;
use std::io::{Read, Write};

const DOMINANT_BIT: u8 = 0b01;
const PACKING_BIT: u8 = 0b10;

/// Tunable parts of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressParams {
    /// How the integer stream is serialized (default: varint).
    pub packing: Packing,
    /// Forces one scan order for every shape. `None` picks the cheapest
    /// order per shape.
    pub scan_order: Option<ScanOrder>,
}

/// Sizes recorded while compressing one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub rows: usize,
    pub cols: usize,
    /// Entries in the shape table.
    pub shapes: usize,
    /// Component placements.
    pub placements: usize,
    /// Bytes after integer packing, including the configuration byte.
    pub packed_len: usize,
    /// Bytes after Huffman coding.
    pub compressed_len: usize,
}

impl CompressionStats {
    /// Size of the image at one bit per pixel divided by the compressed size.
    pub fn ratio(&self) -> f64 {
        if self.compressed_len == 0 {
            return 0.0;
        }
        (self.rows * self.cols).div_ceil(8) as f64 / self.compressed_len as f64
    }
}

/// Scratch state for a single compress call.
#[derive(Debug, Default)]
struct EncodeContext {
    values: Vec<u32>,
}

impl EncodeContext {
    fn push(&mut self, value: usize) -> Result<()> {
        let value = u32::try_from(value)
            .map_err(|_| CodecError::encoding(format!("value {} does not fit in u32", value)))?;
        self.values.push(value);
        Ok(())
    }

    /// Pushes the differences between consecutive entries of an ascending
    /// list, the first against zero.
    fn push_deltas(&mut self, ascending: impl IntoIterator<Item = usize>) -> Result<()> {
        let mut prev = 0;
        for value in ascending {
            self.push(value - prev)?;
            prev = value;
        }
        Ok(())
    }
}

/// Bilevel image compressor.
///
/// The compressor holds only its parameters, so one instance can be shared
/// and reused for any number of images.
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    params: CompressParams,
}

impl Compressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: CompressParams) -> Self {
        Self { params }
    }

    pub fn with_packing(mut self, packing: Packing) -> Self {
        self.params.packing = packing;
        self
    }

    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.params.scan_order = Some(order);
        self
    }

    pub fn params(&self) -> &CompressParams {
        &self.params
    }

    pub fn compress(&self, bitmap: &Bitmap) -> Result<Vec<u8>> {
        self.compress_with_stats(bitmap).map(|(bytes, _)| bytes)
    }

    /// Compresses `bitmap` and reports the size of each stage.
    pub fn compress_with_stats(&self, bitmap: &Bitmap) -> Result<(Vec<u8>, CompressionStats)> {
        let (rows, cols) = bitmap.dimensions();
        if addressable_area(rows, cols).is_none() {
            return Err(CodecError::encoding(format!(
                "{}x{} image has more pixels than the stream can address",
                rows, cols
            )));
        }

        let dominant = bitmap.dominant_color();
        let seg = segment(bitmap, dominant)?;
        let values = self.encode_stream(bitmap, dominant, &seg)?;

        let mut payload = Vec::with_capacity(values.len() * 2 + 1);
        payload.push(config_byte(dominant, self.params.packing));
        payload.extend(self.params.packing.pack(&values));
        let compressed = huffman::encode(&payload)?;

        let stats = CompressionStats {
            rows,
            cols,
            shapes: seg.shape_count(),
            placements: seg.placement_count(),
            packed_len: payload.len(),
            compressed_len: compressed.len(),
        };
        debug!(
            rows,
            cols,
            dominant,
            packing = ?self.params.packing,
            integers = values.len(),
            packed = stats.packed_len,
            compressed = stats.compressed_len,
            "compressed image"
        );
        Ok((compressed, stats))
    }

    fn encode_stream(&self, bitmap: &Bitmap, dominant: bool, seg: &Segmentation) -> Result<Vec<u32>> {
        let mut ctx = EncodeContext::default();
        ctx.push(bitmap.rows())?;
        ctx.push(bitmap.cols())?;
        ctx.push(seg.shape_count())?;

        let encoded: Vec<(ScanOrder, Vec<u32>)> = seg
            .shapes
            .iter()
            .map(|shape| match self.params.scan_order {
                Some(order) => (order, codec::encode_with(shape, order, dominant)),
                None => codec::encode(shape, dominant),
            })
            .collect();

        for pair in encoded.chunks(2) {
            let word = pair
                .iter()
                .enumerate()
                .fold(0u32, |word, (i, (order, _))| word | u32::from(order.tag()) << (2 * i));
            ctx.values.push(word);
        }

        for ((_, runs), refs) in encoded.iter().zip(&seg.shape_blocks) {
            ctx.values.extend_from_slice(runs);
            ctx.push(refs.len())?;
            ctx.push_deltas(refs.iter().copied())?;
        }

        ctx.push_deltas(seg.blocks.iter().map(|block| block.start_offset))?;
        Ok(ctx.values)
    }

    /// Reconstructs the bitmap from bytes produced by [`Compressor::compress`].
    ///
    /// Packing and dominant color are read from the stream, so any
    /// compressor instance can decode the output of any other.
    pub fn decompress(&self, data: &[u8]) -> Result<Bitmap> {
        let payload = huffman::decode(data)?;
        let (&config, packed) = payload
            .split_first()
            .ok_or_else(|| CodecError::format("stream has no configuration byte"))?;
        if config & !(DOMINANT_BIT | PACKING_BIT) != 0 {
            return Err(CodecError::format(format!(
                "unknown configuration bits {:#010b}",
                config
            )));
        }
        let dominant = config & DOMINANT_BIT != 0;
        let packing = Packing::from_flag((config & PACKING_BIT) >> 1);

        let values = packing.unpack(packed)?;
        let bitmap = decode_stream(&values, dominant)?;
        debug!(
            rows = bitmap.rows(),
            cols = bitmap.cols(),
            dominant,
            packing = ?packing,
            integers = values.len(),
            "decompressed image"
        );
        Ok(bitmap)
    }

    /// Compresses `bitmap` into `writer`.
    pub fn compress_to_writer<W: Write>(&self, bitmap: &Bitmap, mut writer: W) -> Result<CompressionStats> {
        let (bytes, stats) = self.compress_with_stats(bitmap)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(stats)
    }

    /// Reads `reader` to the end and decompresses what it held.
    pub fn decompress_from_reader<R: Read>(&self, mut reader: R) -> Result<Bitmap> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.decompress(&data)
    }
}

fn config_byte(dominant: bool, packing: Packing) -> u8 {
    let mut config = packing.flag() << 1;
    if dominant {
        config |= DOMINANT_BIT;
    }
    config
}

/// `rows * cols` when every pixel offset fits in a stream integer.
fn addressable_area(rows: usize, cols: usize) -> Option<usize> {
    rows.checked_mul(cols)
        .filter(|&area| u32::try_from(area).is_ok())
}

fn next(reader: &mut IntReader<'_>, what: &str) -> Result<usize> {
    reader
        .next_value()
        .map(|value| value as usize)
        .ok_or_else(|| CodecError::format(format!("stream ended while reading {}", what)))
}

/// Fails unless at least `count` values remain, so corrupt counts cannot
/// trigger huge allocations.
fn ensure_remaining(reader: &IntReader<'_>, count: usize, what: &str) -> Result<()> {
    if count > reader.remaining() {
        return Err(CodecError::format(format!(
            "{} {} exceed the {} integers left",
            count,
            what,
            reader.remaining()
        )));
    }
    Ok(())
}

fn decode_stream(values: &[u32], dominant: bool) -> Result<Bitmap> {
    let mut reader = IntReader::new(values);
    let rows = next(&mut reader, "image rows")?;
    let cols = next(&mut reader, "image cols")?;
    if addressable_area(rows, cols).is_none() {
        return Err(CodecError::format(format!(
            "{}x{} image has more pixels than the stream can address",
            rows, cols
        )));
    }
    let shape_count = next(&mut reader, "shape count")?;
    ensure_remaining(&reader, shape_count.div_ceil(2), "tag words")?;

    let mut orders = Vec::with_capacity(shape_count);
    for _ in 0..shape_count.div_ceil(2) {
        let word = next(&mut reader, "scan order tags")?;
        if word >> 4 != 0 {
            return Err(CodecError::format(format!("malformed tag word {:#x}", word)));
        }
        for slot in 0..2 {
            if orders.len() < shape_count {
                let tag = ((word >> (2 * slot)) & 0b11) as u8;
                let order = ScanOrder::from_tag(tag)
                    .ok_or_else(|| CodecError::format(format!("unknown scan order tag {}", tag)))?;
                orders.push(order);
            }
        }
    }

    let mut shapes = Vec::with_capacity(shape_count);
    let mut refs = Vec::new();
    for (shape_index, &order) in orders.iter().enumerate() {
        if let (Some(shape_rows), Some(shape_cols)) = (reader.peek(0), reader.peek(1)) {
            if shape_rows as usize > rows || shape_cols as usize > cols {
                return Err(CodecError::format(format!(
                    "{}x{} shape {} does not fit in {}x{} image",
                    shape_rows, shape_cols, shape_index, rows, cols
                )));
            }
        }
        shapes.push(codec::decode(&mut reader, order, dominant)?);

        let ref_count = next(&mut reader, "reference count")?;
        ensure_remaining(&reader, ref_count, "block references")?;
        let mut block_index = 0usize;
        for _ in 0..ref_count {
            block_index = block_index
                .checked_add(next(&mut reader, "block index delta")?)
                .ok_or_else(|| CodecError::format("block index overflows"))?;
            refs.push((block_index, shape_index));
        }
    }

    let placements = refs.len();
    let mut block_shapes: Vec<Option<usize>> = vec![None; placements];
    for (block_index, shape_index) in refs {
        let slot = block_shapes.get_mut(block_index).ok_or_else(|| {
            CodecError::format(format!(
                "block index {} out of range for {} placements",
                block_index, placements
            ))
        })?;
        if slot.replace(shape_index).is_some() {
            return Err(CodecError::format(format!(
                "block {} is referenced by more than one shape",
                block_index
            )));
        }
    }

    let mut canvas = Bitmap::filled(rows, cols, dominant)?;
    let mut offset = 0usize;
    for shape_index in block_shapes {
        let shape_index = shape_index
            .ok_or_else(|| CodecError::format("placement without a shape"))?;
        offset = offset
            .checked_add(next(&mut reader, "placement offset")?)
            .ok_or_else(|| CodecError::format("placement offset overflows"))?;
        if offset >= canvas.area() {
            return Err(CodecError::format(format!(
                "placement offset {} outside {}x{} image",
                offset, rows, cols
            )));
        }
        canvas
            .paint(&shapes[shape_index], offset / cols, offset % cols, !dominant)
            .map_err(|err| {
                CodecError::format(format!("shape {} at offset {}: {}", shape_index, offset, err))
            })?;
    }

    if reader.remaining() != 0 {
        return Err(CodecError::format(format!(
            "{} integers left after the last placement",
            reader.remaining()
        )));
    }
    Ok(canvas)
}
