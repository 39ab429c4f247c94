//! Compressed adjacency streams.
//!
//! A stream is one vertex's neighbor list, delta-encoded into blocks of at
//! most `block_capacity` edges (see [`crate::codec::layout`] for the byte
//! layout). The bytes belong to the caller; this module only provides views:
//!
//! - [`CompressedNeighbors`]: shared view for decoding, folding, filtering,
//!   random access and intersection.
//! - [`CompressedNeighborsMut`]: exclusive view that can pack and repack in
//!   place.
//! - [`CompressedStream`]: an owned buffer plus its live degree, returned by
//!   [`encode`].
//!
//! ### Operation costs
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | `decode` / `map_reduce` | \(O(d)\) work, \(O(C)\) span | forks over blocks |
//! | `pack` | \(O(d)\) work | recompresses each block in place |
//! | `repack` | \(O(d)\) work, \(O(d)\) scratch | rebuilds block boundaries |
//! | `get_ith_neighbor` | \(O(\log b + C)\) | binary search over blocks |
//! | `intersect` | \(O(d_a + d_b)\) | sequential merge |
//!
//! where \(d\) is the degree, \(b\) the block count and \(C\) the block capacity.

use crate::codec::layout::{BlockLayout, Weighting};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::{VertexId, Weight};

mod access;
mod decode;
mod encode;
mod iter;
pub mod monoid;
mod pack;
mod repack;
mod verify;

pub use access::{intersect, intersect_with};
pub use encode::{encode, encode_into, encoded_size};
pub use iter::NeighborIter;
pub use monoid::{make_monoid, FnMonoid, MaxMonoid, MinMonoid, Monoid, SumMonoid};
pub use verify::StreamSummary;

/// One decoded edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Neighbor vertex id.
    pub neighbor: VertexId,
    /// Edge weight; `0` in unweighted streams.
    pub weight: Weight,
}

impl Edge {
    /// Creates an edge.
    #[inline]
    pub const fn new(neighbor: VertexId, weight: Weight) -> Self {
        Self { neighbor, weight }
    }
}

impl From<(VertexId, Weight)> for Edge {
    #[inline]
    fn from((neighbor, weight): (VertexId, Weight)) -> Self {
        Self { neighbor, weight }
    }
}

impl From<Edge> for (VertexId, Weight) {
    #[inline]
    fn from(e: Edge) -> Self {
        (e.neighbor, e.weight)
    }
}

/// Shared view of one vertex's compressed neighbor list.
#[derive(Clone, Copy, Debug)]
pub struct CompressedNeighbors<'a> {
    bytes: &'a [u8],
    source: VertexId,
    degree: u32,
    config: CodecConfig,
}

impl<'a> CompressedNeighbors<'a> {
    /// Views `bytes` as the stream of `source` with `degree` live edges.
    #[inline]
    pub fn new(bytes: &'a [u8], source: VertexId, degree: u32, config: &CodecConfig) -> Self {
        Self {
            bytes,
            source,
            degree,
            config: *config,
        }
    }

    /// The source vertex.
    #[inline]
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Live degree.
    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Returns `true` if no edge is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.degree == 0
    }

    /// The underlying bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The configuration this view reads with.
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Parses the header.
    #[inline]
    pub fn layout(&self) -> Result<BlockLayout<'a>> {
        BlockLayout::read(self.bytes, self.degree, &self.config)
    }

    /// Degree at the last encode or repack (zero for an empty stream).
    pub fn virtual_degree(&self) -> Result<u32> {
        Ok(self.layout()?.virtual_degree())
    }

    /// Number of blocks (zero for an empty stream).
    pub fn num_blocks(&self) -> Result<usize> {
        Ok(self.layout()?.num_blocks())
    }

    /// Weighted or unweighted.
    pub fn weighting(&self) -> Result<Weighting> {
        Ok(self.layout()?.weighting())
    }

    /// Collects every live edge in logical order.
    pub fn to_vec(&self) -> Result<Vec<Edge>> {
        let mut out = vec![Edge::default(); self.degree as usize];
        self.decode_into(&mut out)?;
        Ok(out)
    }
}

/// Exclusive view of one vertex's compressed neighbor list.
///
/// Tracks the live degree across [`pack`](Self::pack) and
/// [`repack`](Self::repack); read it back with [`degree`](Self::degree).
#[derive(Debug)]
pub struct CompressedNeighborsMut<'a> {
    bytes: &'a mut [u8],
    source: VertexId,
    degree: u32,
    config: CodecConfig,
}

impl<'a> CompressedNeighborsMut<'a> {
    /// Views `bytes` as the stream of `source` with `degree` live edges.
    #[inline]
    pub fn new(bytes: &'a mut [u8], source: VertexId, degree: u32, config: &CodecConfig) -> Self {
        Self {
            bytes,
            source,
            degree,
            config: *config,
        }
    }

    /// The source vertex.
    #[inline]
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Live degree.
    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Reborrows as a shared view.
    #[inline]
    pub fn as_neighbors(&self) -> CompressedNeighbors<'_> {
        CompressedNeighbors::new(self.bytes, self.source, self.degree, &self.config)
    }
}

/// An owned stream: encoded bytes plus the live degree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedStream {
    bytes: Box<[u8]>,
    source: VertexId,
    degree: u32,
    config: CodecConfig,
}

impl CompressedStream {
    /// The source vertex.
    #[inline]
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Live degree.
    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// The encoded bytes; the length is fixed at encode time.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared view.
    #[inline]
    pub fn as_neighbors(&self) -> CompressedNeighbors<'_> {
        CompressedNeighbors::new(&self.bytes, self.source, self.degree, &self.config)
    }

    /// Exclusive view. Degree changes made through it are not seen by this
    /// stream; prefer [`pack`](Self::pack) and [`repack`](Self::repack).
    #[inline]
    pub fn as_neighbors_mut(&mut self) -> CompressedNeighborsMut<'_> {
        CompressedNeighborsMut::new(&mut self.bytes, self.source, self.degree, &self.config)
    }

    /// Removes edges failing `pred`; see [`CompressedNeighborsMut::pack`].
    pub fn pack<P>(&mut self, pred: P) -> Result<u32>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
    {
        let degree = self.as_neighbors_mut().pack(pred)?;
        self.degree = degree;
        Ok(degree)
    }

    /// Rebuilds block boundaries; see [`CompressedNeighborsMut::repack`].
    pub fn repack(&mut self) -> Result<()> {
        self.as_neighbors_mut().repack()
    }
}

#[cfg(test)]
mod tests;
