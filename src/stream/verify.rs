//! Structural verification of a stream.

use serde::Serialize;

use super::decode::BlockReader;
use super::CompressedNeighbors;
use crate::codec::layout::{first_block_offset, Weighting, BLOCK_HEADER_BYTES};
use crate::error::{CodecError, Result};

/// Shape of a verified stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Live degree.
    pub degree: u32,
    /// Degree at the last encode or repack.
    pub virtual_degree: u32,
    /// Number of blocks.
    pub num_blocks: usize,
    /// Blocks whose every edge has been packed away.
    pub empty_blocks: usize,
    /// One past the last byte any live edge occupies.
    pub bytes_used: usize,
    /// Weighted or unweighted.
    pub weighting: Weighting,
}

impl CompressedNeighbors<'_> {
    /// Decodes every block and checks the layout invariants: offsets increase,
    /// block 0 starts at index 0, no block holds more than `block_capacity`
    /// edges, neighbors never decrease and no block's bytes run into the next
    /// block.
    pub fn verify(&self) -> Result<StreamSummary> {
        let layout = self.layout()?;
        let num_blocks = layout.num_blocks();
        let starts = layout.byte_starts()?;
        let capacity = self.config.block_capacity as usize;

        let mut empty_blocks = 0;
        let mut bytes_used = if num_blocks == 0 {
            0
        } else {
            first_block_offset(num_blocks)
        };
        let mut prev = None;
        for block in 0..num_blocks {
            let info = layout.block(block)?;
            if block == 0 && info.start != 0 {
                return Err(CodecError::invariant(0, format!("starts at index {}", info.start)));
            }
            if info.len() > capacity {
                return Err(CodecError::invariant(
                    block,
                    format!("holds {} edges, capacity is {capacity}", info.len()),
                ));
            }
            if info.is_empty() {
                empty_blocks += 1;
                bytes_used = bytes_used.max(info.byte_start + BLOCK_HEADER_BYTES);
                continue;
            }
            let mut reader = BlockReader::new(&layout, &info, self.source);
            while let Some((index, edge)) = reader.next_edge()? {
                if prev.is_some_and(|p| edge.neighbor < p) {
                    return Err(CodecError::invariant(
                        block,
                        format!("neighbor {} at index {index} decreases", edge.neighbor),
                    ));
                }
                prev = Some(edge.neighbor);
            }
            let end = reader.position();
            if let Some(&next) = starts.get(block + 1) {
                if end > next {
                    return Err(CodecError::invariant(
                        block,
                        format!("edges end at byte {end}, past next block at {next}"),
                    ));
                }
            }
            bytes_used = bytes_used.max(end);
        }

        Ok(StreamSummary {
            degree: self.degree,
            virtual_degree: layout.virtual_degree(),
            num_blocks,
            empty_blocks,
            bytes_used,
            weighting: layout.weighting(),
        })
    }
}
