//! Pack and filter: removing edges that fail a predicate.
//!
//! `pack` works in place. Every block task owns exactly its block's byte
//! region (split with `split_at_mut`), recompresses its survivors at the start
//! of that region and reports a count; a sequential scan over the counts then
//! rewrites the block start indices. Survivors are a subsequence of the block,
//! so their encoding never needs more bytes than the block consumed; the size
//! is still checked before anything is written.

use tracing::{debug, trace};

use super::decode::{read_edge, BlockReader};
use super::encode::{block_edges_len, write_block_edges};
use super::{CompressedNeighbors, CompressedNeighborsMut, Edge};
use crate::codec::cursor::{write_word, ByteReader, ByteWriter};
use crate::codec::layout::{BlockInfo, BlockLayout, BLOCK_HEADER_BYTES};
use crate::collections::ScratchBuf;
use crate::concurrency::par;
use crate::error::{to_u32, CodecError, Result};
use crate::{VertexId, Weight};

/// Survivors staged inline before spilling to the heap.
const INLINE_SURVIVORS: usize = 64;

impl CompressedNeighborsMut<'_> {
    /// Keeps only the edges for which `pred(source, neighbor, weight)` holds
    /// and returns the new live degree, which is also stored in this view.
    ///
    /// If the live degree falls below `virtual_degree / repack_divisor` the
    /// stream is repacked before returning. `pred` may run concurrently on
    /// several blocks and must give the same answer for the same edge.
    pub fn pack<P>(&mut self, pred: P) -> Result<u32>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
    {
        if self.degree == 0 {
            return Ok(0);
        }
        let config = self.config;
        let source = self.source;
        let (infos, starts, weighted, virtual_degree) = {
            let layout = BlockLayout::read(&*self.bytes, self.degree, &config)?;
            let infos = (0..layout.num_blocks())
                .map(|b| layout.block(b))
                .collect::<Result<Vec<_>>>()?;
            (
                infos,
                layout.byte_starts()?,
                layout.weighting().is_weighted(),
                layout.virtual_degree(),
            )
        };

        let regions = par::split_regions(self.bytes, &starts);
        let counts = par::map_owned(regions, config.fork_blocks(infos.len()), |b, region| {
            pack_block(region, &infos[b], source, weighted, &pred)
        })
        .into_iter()
        .collect::<Result<Vec<u32>>>()?;

        let mut live = 0u32;
        for (&start, count) in starts.iter().zip(counts) {
            write_word(self.bytes, start, live)?;
            live += count;
        }
        self.degree = live;

        if config.should_repack(live, virtual_degree) {
            debug!(source, live, virtual_degree, "pack below compaction threshold, repacking");
            self.repack()?;
        }
        Ok(live)
    }
}

/// Filters one block in place and returns its survivor count. `region` begins
/// at the block header; the start index word is left for the caller.
fn pack_block<P>(
    region: &mut [u8],
    info: &BlockInfo,
    source: VertexId,
    weighted: bool,
    pred: &P,
) -> Result<u32>
where
    P: Fn(VertexId, VertexId, Weight) -> bool,
{
    let len = info.len();
    if len == 0 {
        return Ok(0);
    }
    let mut survivors = ScratchBuf::<Edge, INLINE_SURVIVORS>::new();
    let consumed = {
        let mut reader = ByteReader::at(region, BLOCK_HEADER_BYTES);
        let mut prev = None;
        for _ in 0..len {
            let edge = read_edge(&mut reader, source, prev, weighted)?;
            prev = Some(edge.neighbor);
            if pred(source, edge.neighbor, edge.weight) {
                survivors.push(edge);
            }
        }
        reader.position()
    };

    let kept = survivors.len();
    if kept == len || kept == 0 {
        // Unchanged, or fully dead and never read again.
        return to_u32(kept);
    }
    let needed = BLOCK_HEADER_BYTES + block_edges_len(source, survivors.iter().copied(), weighted);
    if needed > consumed {
        return Err(CodecError::invariant(
            info.id,
            format!("survivors need {needed} bytes but the block holds {consumed}"),
        ));
    }
    let mut writer = ByteWriter::at(region, BLOCK_HEADER_BYTES);
    write_block_edges(&mut writer, source, survivors.iter().copied(), weighted)?;
    to_u32(kept)
}

impl CompressedNeighbors<'_> {
    /// Streams the edges satisfying `pred(source, neighbor, weight)` to
    /// `out(position, edge)` in logical order without modifying the stream.
    /// Returns the number of edges emitted.
    ///
    /// Degrees up to
    /// [`filter_sequential_threshold`](crate::CodecConfig::filter_sequential_threshold)
    /// take a single sequential pass. Larger streams are processed in rounds
    /// of blocks holding about `degree / filter_chunk_divisor` edges, each
    /// round filtered in parallel into a temporary buffer and then drained.
    pub fn filter<P, O>(&self, pred: P, mut out: O) -> Result<usize>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
        O: FnMut(usize, Edge),
    {
        if self.degree <= self.config.filter_sequential_threshold {
            self.filter_sequential(&pred, &mut out)
        } else {
            self.filter_chunked(&pred, &mut out)
        }
    }

    fn filter_sequential<P, O>(&self, pred: &P, out: &mut O) -> Result<usize>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool,
        O: FnMut(usize, Edge),
    {
        let mut emitted = 0;
        for edge in self.iter()? {
            let edge = edge?;
            if pred(self.source, edge.neighbor, edge.weight) {
                out(emitted, edge);
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    fn filter_chunked<P, O>(&self, pred: &P, out: &mut O) -> Result<usize>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
        O: FnMut(usize, Edge),
    {
        let layout = self.layout()?;
        let num_blocks = layout.num_blocks();
        let per_round = self.degree as usize / self.config.filter_chunk_divisor.max(1) as usize;
        let blocks_per_round = (per_round / self.config.block_capacity.max(1) as usize).max(1);

        let mut emitted = 0;
        let mut first = 0;
        while first < num_blocks {
            let last = (first + blocks_per_round).min(num_blocks);
            let fork = self.config.fork_blocks(last - first);
            let staged = par::map_indexed(last - first, fork, |i| -> Result<Vec<Edge>> {
                let info = layout.block(first + i)?;
                let mut reader = BlockReader::new(&layout, &info, self.source);
                let mut kept = Vec::with_capacity(info.len());
                while let Some((_, edge)) = reader.next_edge()? {
                    if pred(self.source, edge.neighbor, edge.weight) {
                        kept.push(edge);
                    }
                }
                Ok(kept)
            });
            trace!(source = self.source, first, last, "filter round");
            for block in staged {
                for edge in block? {
                    out(emitted, edge);
                    emitted += 1;
                }
            }
            first = last;
        }
        Ok(emitted)
    }
}
