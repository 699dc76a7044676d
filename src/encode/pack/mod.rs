//! Integer stream packing.
//!
//! Two interchangeable packers turn the pipeline's `u32` stream into bytes:
//! - `varint` - whole-byte little-endian values with a width trailer (default)
//! - `bits` - minimal-bit-width values with a width trailer

pub mod bits;
pub mod varint;

use crate::utils::error::Result;

/// Which packer serializes the integer stream. Recorded in bit 1 of the
/// stream's configuration byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Packing {
    #[default]
    Varint,
    Bits,
}

impl Packing {
    pub fn pack(self, values: &[u32]) -> Vec<u8> {
        match self {
            Packing::Varint => varint::pack(values),
            Packing::Bits => bits::pack(values),
        }
    }

    pub fn unpack(self, data: &[u8]) -> Result<Vec<u32>> {
        match self {
            Packing::Varint => varint::unpack(data),
            Packing::Bits => bits::unpack(data),
        }
    }

    pub(crate) fn flag(self) -> u8 {
        match self {
            Packing::Varint => 0,
            Packing::Bits => 1,
        }
    }

    pub(crate) fn from_flag(flag: u8) -> Self {
        if flag == 0 { Packing::Varint } else { Packing::Bits }
    }
}
