//! Sequential cursors over a stream.

use core::iter::FusedIterator;

use super::decode::{read_edge, BlockReader};
use super::{CompressedNeighbors, Edge};
use crate::codec::cursor::ByteReader;
use crate::codec::layout::{first_block_offset, BlockLayout};
use crate::error::Result;
use crate::VertexId;

/// Iterator over the live edges of a stream in logical order.
///
/// Blocks emptied by packing are skipped. After yielding an error the
/// iterator is exhausted.
#[derive(Clone, Debug)]
pub struct NeighborIter<'a> {
    layout: BlockLayout<'a>,
    source: VertexId,
    next_block: usize,
    current: Option<BlockReader<'a>>,
    failed: bool,
}

impl<'a> NeighborIter<'a> {
    fn new(layout: BlockLayout<'a>, source: VertexId) -> Self {
        Self {
            layout,
            source,
            next_block: 0,
            current: None,
            failed: false,
        }
    }
}

impl Iterator for NeighborIter<'_> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(reader) = &mut self.current {
                match reader.next_edge() {
                    Ok(Some((_, edge))) => return Some(Ok(edge)),
                    Ok(None) => self.current = None,
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                }
            }
            if self.next_block >= self.layout.num_blocks() {
                return None;
            }
            match self.layout.block(self.next_block) {
                Ok(info) => {
                    self.current = Some(BlockReader::new(&self.layout, &info, self.source));
                    self.next_block += 1;
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl FusedIterator for NeighborIter<'_> {}

/// Walk over a stream whose live degree equals its virtual degree.
///
/// Such a stream has every block full except the last and its blocks laid
/// out back to back, so block boundaries are found by counting edges rather
/// than through the offset table.
#[derive(Clone, Debug)]
pub(crate) struct CanonicalWalk<'a> {
    reader: ByteReader<'a>,
    source: VertexId,
    weighted: bool,
    capacity: usize,
    index: usize,
    degree: usize,
    prev: Option<VertexId>,
}

impl CanonicalWalk<'_> {
    fn next_edge(&mut self) -> Result<Option<Edge>> {
        if self.index >= self.degree {
            return Ok(None);
        }
        if self.index % self.capacity == 0 {
            // Start index word of the next block.
            self.reader.read_u32()?;
            self.prev = None;
        }
        let edge = read_edge(&mut self.reader, self.source, self.prev, self.weighted)?;
        self.prev = Some(edge.neighbor);
        self.index += 1;
        Ok(Some(edge))
    }
}

/// The cheapest sequential walk available for a stream.
#[derive(Clone, Debug)]
pub(crate) enum Walk<'a> {
    Canonical(CanonicalWalk<'a>),
    Blocked(NeighborIter<'a>),
}

impl Walk<'_> {
    #[inline]
    pub(crate) fn next_edge(&mut self) -> Result<Option<Edge>> {
        match self {
            Walk::Canonical(w) => w.next_edge(),
            Walk::Blocked(it) => it.next().transpose(),
        }
    }
}

impl<'a> CompressedNeighbors<'a> {
    /// Sequential iterator over the live edges.
    pub fn iter(&self) -> Result<NeighborIter<'a>> {
        Ok(NeighborIter::new(self.layout()?, self.source))
    }

    pub(crate) fn walk(&self) -> Result<Walk<'a>> {
        let layout = self.layout()?;
        if layout.virtual_degree() != layout.degree() {
            return Ok(Walk::Blocked(NeighborIter::new(layout, self.source)));
        }
        Ok(Walk::Canonical(CanonicalWalk {
            reader: ByteReader::at(layout.bytes(), first_block_offset(layout.num_blocks())),
            source: self.source,
            weighted: layout.weighting().is_weighted(),
            capacity: self.config.block_capacity.max(1) as usize,
            index: 0,
            degree: layout.degree() as usize,
            prev: None,
        }))
    }
}
