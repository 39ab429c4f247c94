//! Stream header and block table.
//!
//! ```text
//! +----------------+-------+------------------------------+---------+---------+-----
//! | virtual_degree | flags | block offsets 1..num_blocks  | block 0 | block 1 | ...
//! |      u32       |  u8   |     (num_blocks - 1) x u32   |         |         |
//! +----------------+-------+------------------------------+---------+---------+-----
//!
//! block := start_index:u32, first edge (signed delta from source),
//!          remaining edges (unsigned delta from previous), weights interleaved
//! ```
//!
//! A block's logical extent is `[start_index, next start_index)`, or
//! `[start_index, degree)` for the last block. Extents may be empty after a
//! pack; the bytes of an empty block are simply not read.

use serde::{Deserialize, Serialize};

use crate::codec::cursor::{read_word, write_word, WORD};
use crate::config::CodecConfig;
use crate::error::{to_u32, CodecError, Result};

/// Bytes before the offset table: virtual degree plus flags.
pub const HEADER_BYTES: usize = WORD + 1;

/// Bytes before the first edge of a block.
pub const BLOCK_HEADER_BYTES: usize = WORD;

const WEIGHTED_FLAG: u8 = 0x01;

/// Whether each neighbor id is followed by a weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weighting {
    /// Neighbor ids only; decoded weights are `0`.
    #[default]
    Unweighted,
    /// Each neighbor carries an `i32` weight.
    Weighted,
}

impl Weighting {
    /// Returns `true` for [`Weighting::Weighted`].
    #[inline]
    pub fn is_weighted(self) -> bool {
        matches!(self, Self::Weighted)
    }

    #[inline]
    fn flags(self) -> u8 {
        if self.is_weighted() {
            WEIGHTED_FLAG
        } else {
            0
        }
    }

    fn from_flags(flags: u8) -> Result<Self> {
        match flags {
            0 => Ok(Self::Unweighted),
            WEIGHTED_FLAG => Ok(Self::Weighted),
            other => Err(CodecError::corrupt(format!("unknown flags {other:#04x}"))),
        }
    }
}

/// Byte offset of block 0 in a stream with `num_blocks` blocks.
#[inline]
pub fn first_block_offset(num_blocks: usize) -> usize {
    HEADER_BYTES + WORD * num_blocks.saturating_sub(1)
}

/// Writes the fixed part of the header.
pub fn write_header(bytes: &mut [u8], virtual_degree: u32, weighting: Weighting) -> Result<()> {
    write_word(bytes, 0, virtual_degree)?;
    let available = bytes.len();
    let flags = bytes.get_mut(WORD).ok_or(CodecError::CapacityExceeded {
        needed: HEADER_BYTES,
        available,
    })?;
    *flags = weighting.flags();
    Ok(())
}

/// Records the byte offset of `block` (which must be at least 1) in the table.
#[inline]
pub fn write_block_offset(bytes: &mut [u8], block: usize, offset: usize) -> Result<()> {
    debug_assert!(block > 0, "block 0 has an implicit offset");
    write_word(bytes, HEADER_BYTES + WORD * (block - 1), to_u32(offset)?)
}

/// Read-only view of a stream's header and block table.
///
/// Construction checks only that the header and offset table fit in the
/// buffer; individual block accessors check their own reads.
#[derive(Clone, Copy, Debug)]
pub struct BlockLayout<'a> {
    bytes: &'a [u8],
    virtual_degree: u32,
    degree: u32,
    num_blocks: usize,
    weighting: Weighting,
}

impl<'a> BlockLayout<'a> {
    /// Parses the header of a stream whose live degree is `degree`.
    ///
    /// A zero `degree` yields a layout with no blocks without touching `bytes`.
    pub fn read(bytes: &'a [u8], degree: u32, config: &CodecConfig) -> Result<Self> {
        if degree == 0 {
            return Ok(Self {
                bytes,
                virtual_degree: 0,
                degree: 0,
                num_blocks: 0,
                weighting: Weighting::Unweighted,
            });
        }
        let virtual_degree = read_word(bytes, 0)?;
        let flags = *bytes.get(WORD).ok_or(CodecError::Truncated { offset: WORD })?;
        let weighting = Weighting::from_flags(flags)?;
        if virtual_degree < degree {
            return Err(CodecError::corrupt(format!(
                "live degree {degree} exceeds virtual degree {virtual_degree}"
            )));
        }
        let num_blocks = config.num_blocks(virtual_degree);
        let needed = first_block_offset(num_blocks) + BLOCK_HEADER_BYTES;
        if bytes.len() < needed {
            return Err(CodecError::Truncated {
                offset: bytes.len(),
            });
        }
        Ok(Self {
            bytes,
            virtual_degree,
            degree,
            num_blocks,
            weighting,
        })
    }

    /// The underlying bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Degree at the time of the last encode or repack.
    #[inline]
    pub fn virtual_degree(&self) -> u32 {
        self.virtual_degree
    }

    /// Live degree.
    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Number of blocks, derived from the virtual degree.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Weighted or unweighted.
    #[inline]
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Buffer offset where `block`'s header begins.
    pub fn block_byte_start(&self, block: usize) -> Result<usize> {
        debug_assert!(block < self.num_blocks);
        let first = first_block_offset(self.num_blocks);
        if block == 0 {
            return Ok(first);
        }
        let start = read_word(self.bytes, HEADER_BYTES + WORD * (block - 1))? as usize;
        if start < first || start + BLOCK_HEADER_BYTES > self.bytes.len() {
            return Err(CodecError::corrupt(format!(
                "block {block} offset {start} outside {first}..{}",
                self.bytes.len()
            )));
        }
        Ok(start)
    }

    /// Logical index of `block`'s first edge.
    #[inline]
    pub fn start_index(&self, block: usize) -> Result<u32> {
        read_word(self.bytes, self.block_byte_start(block)?)
    }

    /// Logical index one past `block`'s last live edge.
    #[inline]
    pub fn end_index(&self, block: usize) -> Result<u32> {
        if block + 1 == self.num_blocks {
            Ok(self.degree)
        } else {
            self.start_index(block + 1)
        }
    }

    /// Header offset, edge-data offset and logical extent of `block`.
    pub fn block(&self, block: usize) -> Result<BlockInfo> {
        let byte_start = self.block_byte_start(block)?;
        let start = read_word(self.bytes, byte_start)?;
        let end = self.end_index(block)?;
        if start > end || end > self.degree {
            return Err(CodecError::invariant(
                block,
                format!("extent {start}..{end} invalid for degree {}", self.degree),
            ));
        }
        Ok(BlockInfo {
            id: block,
            byte_start,
            start,
            end,
        })
    }

    /// Finds the block whose extent contains `index`.
    ///
    /// Binary search over block end indices, which are non-decreasing.
    pub fn locate_block(&self, index: u32) -> Result<usize> {
        if index >= self.degree {
            return Err(CodecError::IndexOutOfRange {
                index: index as usize,
                degree: self.degree as usize,
            });
        }
        let (mut lo, mut hi) = (0, self.num_blocks);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.end_index(mid)? <= index {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == self.num_blocks {
            return Err(CodecError::corrupt(format!("no block holds index {index}")));
        }
        Ok(lo)
    }

    /// Byte starts of every block, checked to be strictly increasing.
    pub fn byte_starts(&self) -> Result<Vec<usize>> {
        let mut starts = Vec::with_capacity(self.num_blocks);
        for block in 0..self.num_blocks {
            let s = self.block_byte_start(block)?;
            if let Some(&prev) = starts.last() {
                if s <= prev {
                    return Err(CodecError::corrupt(format!(
                        "block {block} starts at {s}, not after {prev}"
                    )));
                }
            }
            starts.push(s);
        }
        Ok(starts)
    }
}

/// Location and logical extent of one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Block id.
    pub id: usize,
    /// Buffer offset of the block header.
    pub byte_start: usize,
    /// First logical index.
    pub start: u32,
    /// One past the last live logical index.
    pub end: u32,
}

impl BlockInfo {
    /// Number of live edges.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether packing removed every edge of this block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Buffer offset of the first edge.
    #[inline]
    pub fn edges_start(&self) -> usize {
        self.byte_start + BLOCK_HEADER_BYTES
    }
}
