//! A graph whose adjacency lists are compressed streams in one buffer.
//!
//! Every vertex owns the byte range `offsets[v]..offsets[v + 1]` of a single
//! contiguous allocation plus a live degree. Bulk mutation splits the buffer
//! at those offsets, so each vertex's stream is packed by exactly one task.

use tracing::warn;

use crate::codec::layout::Weighting;
use crate::concurrency::par;
use crate::config::CodecConfig;
use crate::error::{to_u32, Result};
use crate::stream::{
    encode_into, encoded_size, CompressedNeighbors, CompressedNeighborsMut, StreamSummary,
};
use crate::{VertexId, Weight};

pub use traversal::{bfs, compression_stats, triangle_count, CompressionStats};

/// Compressed adjacency-list graph.
#[derive(Clone, Debug)]
pub struct CompressedGraph {
    config: CodecConfig,
    /// Byte offset of each vertex's stream; `node_count + 1` entries.
    offsets: Vec<usize>,
    /// Live degree per vertex.
    degrees: Vec<u32>,
    bytes: Vec<u8>,
    weighting: Weighting,
}

impl CompressedGraph {
    /// Builds a graph from an unweighted adjacency list.
    ///
    /// Each list is sorted and deduplicated before encoding.
    pub fn from_adjacency(adjacency: &[Vec<VertexId>], config: &CodecConfig) -> Result<Self> {
        let lists: Vec<Vec<VertexId>> = adjacency
            .iter()
            .map(|neighbors| {
                let mut sorted = neighbors.clone();
                sorted.sort_unstable();
                sorted.dedup();
                sorted
            })
            .collect();
        let weights: Vec<Vec<Weight>> = Vec::new();
        Self::build(&lists, &weights, Weighting::Unweighted, config)
    }

    /// Builds a graph from `(neighbor, weight)` lists.
    ///
    /// Each list is sorted by neighbor; of repeated neighbors the first weight
    /// in sorted order is kept.
    pub fn from_weighted_adjacency(
        adjacency: &[Vec<(VertexId, Weight)>],
        config: &CodecConfig,
    ) -> Result<Self> {
        let (lists, weights): (Vec<_>, Vec<_>) = adjacency
            .iter()
            .map(|edges| {
                let mut sorted = edges.clone();
                sorted.sort_by_key(|&(n, _)| n);
                sorted.dedup_by_key(|&mut (n, _)| n);
                sorted.into_iter().unzip::<_, _, Vec<_>, Vec<_>>()
            })
            .unzip();
        Self::build(&lists, &weights, Weighting::Weighted, config)
    }

    fn build(
        lists: &[Vec<VertexId>],
        weights: &[Vec<Weight>],
        weighting: Weighting,
        config: &CodecConfig,
    ) -> Result<Self> {
        config.validate()?;
        to_u32(lists.len())?;
        let weights_of = |v: usize| weighting.is_weighted().then(|| weights[v].as_slice());

        let sizes = par::map_indexed(lists.len(), config.parallel, |v| {
            encoded_size(&lists[v], weights_of(v), v as VertexId, config)
        });
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut total = 0;
        for size in sizes {
            offsets.push(total);
            total += size?;
        }
        offsets.push(total);

        let mut bytes = vec![0u8; total];
        let regions = par::split_regions(&mut bytes, &offsets[..lists.len()]);
        par::map_owned(regions, config.parallel, |v, region| {
            encode_into(region, &lists[v], weights_of(v), v as VertexId, config)
        })
        .into_iter()
        .collect::<Result<Vec<usize>>>()?;

        let degrees = lists
            .iter()
            .map(|l| to_u32(l.len()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            config: *config,
            offsets,
            degrees,
            bytes,
            weighting,
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.degrees.iter().map(|&d| d as usize).sum()
    }

    /// Live degree of `node`.
    #[inline]
    pub fn degree(&self, node: VertexId) -> u32 {
        assert!((node as usize) < self.node_count(), "node index out of bounds");
        self.degrees[node as usize]
    }

    /// Weighted or unweighted.
    #[inline]
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// The codec configuration every stream was written with.
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Total size of the stream buffer.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// View of `node`'s neighbor stream.
    #[inline]
    pub fn neighbors(&self, node: VertexId) -> CompressedNeighbors<'_> {
        let v = node as usize;
        assert!(v < self.node_count(), "node index out of bounds");
        let bytes = &self.bytes[self.offsets[v]..self.offsets[v + 1]];
        CompressedNeighbors::new(bytes, node, self.degrees[v], &self.config)
    }

    /// Whether `to` is a live neighbor of `from`.
    pub fn has_edge(&self, from: VertexId, to: VertexId) -> Result<bool> {
        for edge in self.neighbors(from).iter()? {
            let neighbor = edge?.neighbor;
            if neighbor >= to {
                return Ok(neighbor == to);
            }
        }
        Ok(false)
    }

    /// Packs `node`'s stream with `pred` and returns its new degree.
    pub fn pack_vertex<P>(&mut self, node: VertexId, pred: P) -> Result<u32>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
    {
        let v = node as usize;
        assert!(v < self.node_count(), "node index out of bounds");
        let bytes = &mut self.bytes[self.offsets[v]..self.offsets[v + 1]];
        let mut view = CompressedNeighborsMut::new(bytes, node, self.degrees[v], &self.config);
        let degree = view.pack(pred)?;
        self.degrees[v] = degree;
        Ok(degree)
    }

    /// Packs every vertex with `pred`, one task per vertex, and returns the
    /// number of edges removed.
    pub fn filter_edges<P>(&mut self, pred: P) -> Result<usize>
    where
        P: Fn(VertexId, VertexId, Weight) -> bool + Sync + Send,
    {
        let n = self.node_count();
        let config = self.config;
        let before = self.edge_count();
        let degrees = &self.degrees;
        let regions = par::split_regions(&mut self.bytes, &self.offsets[..n]);
        let packed = par::map_owned(regions, config.parallel, |v, region| {
            let node = v as VertexId;
            CompressedNeighborsMut::new(region, node, degrees[v], &config)
                .pack(&pred)
                .inspect_err(|err| warn!(node, %err, "pack failed during bulk filter"))
        })
        .into_iter()
        .collect::<Result<Vec<u32>>>()?;
        self.degrees = packed;
        Ok(before - self.edge_count())
    }

    /// Verifies every stream and returns the per-vertex summaries.
    pub fn verify(&self) -> Result<Vec<StreamSummary>> {
        par::map_indexed(self.node_count(), self.config.parallel, |v| {
            let node = v as VertexId;
            self.neighbors(node)
                .verify()
                .inspect_err(|err| warn!(node, %err, "stream failed verification"))
        })
        .into_iter()
        .collect()
    }
}

mod traversal;
