//! Decode engine: visiting, folding and bulk-decoding live edges.

use core::ops::Range;

use super::monoid::Monoid;
use super::{CompressedNeighbors, Edge};
use crate::codec::cursor::ByteReader;
use crate::codec::layout::{BlockInfo, BlockLayout};
use crate::codec::varint;
use crate::concurrency::par;
use crate::error::{CodecError, Result};
use crate::{VertexId, Weight};

/// Reads one edge. `prev` is the previous neighbor of the same block, or
/// `None` at the start of a block.
#[inline]
pub(crate) fn read_edge(
    reader: &mut ByteReader<'_>,
    source: VertexId,
    prev: Option<VertexId>,
    weighted: bool,
) -> Result<Edge> {
    let at = reader.position();
    let neighbor = match prev {
        None => varint::decode_first(reader, source)?,
        Some(p) => {
            let delta = varint::decode_delta(reader)?;
            p.checked_add(delta)
                .ok_or(CodecError::MalformedVarint { offset: at })?
        }
    };
    let weight = if weighted {
        varint::decode_weight(reader)?
    } else {
        0
    };
    Ok(Edge { neighbor, weight })
}

/// Cursor over the live edges of one block.
#[derive(Clone, Debug)]
pub(crate) struct BlockReader<'a> {
    reader: ByteReader<'a>,
    source: VertexId,
    weighted: bool,
    index: usize,
    end: usize,
    prev: Option<VertexId>,
}

impl<'a> BlockReader<'a> {
    pub(crate) fn new(layout: &BlockLayout<'a>, info: &BlockInfo, source: VertexId) -> Self {
        Self {
            reader: ByteReader::at(layout.bytes(), info.edges_start()),
            source,
            weighted: layout.weighting().is_weighted(),
            index: info.start as usize,
            end: info.end as usize,
            prev: None,
        }
    }

    /// Byte offset just past the last edge read.
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.reader.position()
    }

    /// Next `(logical index, edge)`, or `None` at the block's live end.
    #[inline]
    pub(crate) fn next_edge(&mut self) -> Result<Option<(usize, Edge)>> {
        if self.index >= self.end {
            return Ok(None);
        }
        let edge = read_edge(&mut self.reader, self.source, self.prev, self.weighted)?;
        self.prev = Some(edge.neighbor);
        let index = self.index;
        self.index += 1;
        Ok(Some((index, edge)))
    }
}

impl<'a> CompressedNeighbors<'a> {
    /// Visits every live `(neighbor, weight, index)` in ascending index order
    /// within each block.
    ///
    /// Returning `false` from `visit` stops the current block only; blocks
    /// already running on other threads continue. Blocks are decoded in
    /// parallel when the stream has more than
    /// [`parallel_block_threshold`](crate::CodecConfig::parallel_block_threshold)
    /// blocks, so `visit` may be called concurrently.
    pub fn decode<F>(&self, visit: F) -> Result<()>
    where
        F: Fn(VertexId, Weight, usize) -> bool + Sync + Send,
    {
        let layout = self.layout()?;
        let num_blocks = layout.num_blocks();
        par::try_for_each_index(0..num_blocks, self.config.fork_blocks(num_blocks), |b| {
            self.visit_block(&layout, b, |i, e| visit(e.neighbor, e.weight, i))
        })
    }

    /// Sequential [`decode`](Self::decode): same visits, same block-local
    /// stop, on the calling thread and in global index order.
    pub fn decode_seq<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(VertexId, Weight, usize) -> bool,
    {
        let layout = self.layout()?;
        for b in 0..layout.num_blocks() {
            self.visit_block(&layout, b, |i, e| visit(e.neighbor, e.weight, i))?;
        }
        Ok(())
    }

    /// Sequentially decodes the blocks in `blocks` (clamped to the block
    /// count), passing `(index, edge)` to `visit` until it returns `false`.
    ///
    /// For callers that partition work by block id.
    pub fn decode_blocks<F>(&self, blocks: Range<usize>, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, Edge) -> bool,
    {
        let layout = self.layout()?;
        let end = blocks.end.min(layout.num_blocks());
        for b in blocks.start.min(end)..end {
            self.visit_block(&layout, b, &mut visit)?;
        }
        Ok(())
    }

    /// Writes every live edge into `out[..degree]`, block by block in parallel.
    pub fn decode_into(&self, out: &mut [Edge]) -> Result<()> {
        let degree = self.degree as usize;
        if out.len() < degree {
            return Err(CodecError::CapacityExceeded {
                needed: degree,
                available: out.len(),
            });
        }
        let layout = self.layout()?;
        let num_blocks = layout.num_blocks();
        let infos = (0..num_blocks)
            .map(|b| layout.block(b))
            .collect::<Result<Vec<_>>>()?;
        if let Some(first) = infos.first() {
            if first.start != 0 {
                let detail = format!("starts at index {}", first.start);
                return Err(CodecError::invariant(0, detail));
            }
        }
        let lengths: Vec<usize> = infos.iter().map(BlockInfo::len).collect();
        let parts = par::split_lengths(&mut out[..degree], &lengths);
        let fork = self.config.fork_blocks(num_blocks);
        let results = par::map_owned(parts, fork, |b, part| -> Result<()> {
            let mut reader = BlockReader::new(&layout, &infos[b], self.source);
            for slot in part.iter_mut() {
                match reader.next_edge()? {
                    Some((_, e)) => *slot = e,
                    None => return Err(CodecError::invariant(b, "ended before its extent")),
                }
            }
            Ok(())
        });
        results.into_iter().collect()
    }

    /// Folds `map(source, neighbor, weight)` over every live edge.
    ///
    /// One partial per block is computed in parallel starting from
    /// `monoid.identity()`; partials are combined in block order, so `combine`
    /// must be associative but need not commute. An empty stream yields the
    /// identity.
    pub fn map_reduce<E, M, G>(&self, map: G, monoid: &M) -> Result<E>
    where
        E: Send,
        M: Monoid<E>,
        G: Fn(VertexId, VertexId, Weight) -> E + Sync + Send,
    {
        let layout = self.layout()?;
        let num_blocks = layout.num_blocks();
        let fork = self.config.fork_blocks(num_blocks);
        let partials = par::map_indexed(num_blocks, fork, |b| -> Result<E> {
            let info = layout.block(b)?;
            let mut reader = BlockReader::new(&layout, &info, self.source);
            let mut acc = monoid.identity();
            while let Some((_, e)) = reader.next_edge()? {
                acc = monoid.combine(acc, map(self.source, e.neighbor, e.weight));
            }
            Ok(acc)
        });
        let mut total = monoid.identity();
        for partial in partials {
            total = monoid.combine(total, partial?);
        }
        Ok(total)
    }

    fn visit_block<V>(&self, layout: &BlockLayout<'a>, block: usize, mut visit: V) -> Result<()>
    where
        V: FnMut(usize, Edge) -> bool,
    {
        let info = layout.block(block)?;
        let mut reader = BlockReader::new(layout, &info, self.source);
        while let Some((i, e)) = reader.next_edge()? {
            if !visit(i, e) {
                break;
            }
        }
        Ok(())
    }
}
