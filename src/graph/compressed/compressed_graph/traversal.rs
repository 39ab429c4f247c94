//! Traversals and statistics over a compressed graph.

use std::collections::VecDeque;

use serde::Serialize;

use super::CompressedGraph;
use crate::concurrency::{par, VisitedSet};
use crate::error::Result;
use crate::VertexId;

/// Breadth-first order of the vertices reachable from `start`.
pub fn bfs(graph: &CompressedGraph, start: VertexId) -> Result<Vec<VertexId>> {
    assert!((start as usize) < graph.node_count(), "start out of bounds");

    let visited = VisitedSet::new(graph.node_count());
    let mut out = Vec::with_capacity(graph.node_count());
    let mut queue = VecDeque::with_capacity(64);
    visited.try_visit(start as usize);
    queue.push_back(start);

    while let Some(u) = queue.pop_front() {
        out.push(u);
        for edge in graph.neighbors(u).iter()? {
            let v = edge?.neighbor;
            if visited.try_visit(v as usize) {
                queue.push_back(v);
            }
        }
    }
    Ok(out)
}

/// Number of triangles `u < v < w` in a graph with symmetric adjacency.
///
/// For every edge `u -> v` with `u < v`, intersects the two neighbor lists
/// and counts the shared ids above `v`. Vertices are processed in parallel.
pub fn triangle_count(graph: &CompressedGraph) -> Result<u64> {
    let fork = graph.config().parallel;
    let per_vertex = par::map_indexed(graph.node_count(), fork, |u| -> Result<u64> {
        let u = u as VertexId;
        let own = graph.neighbors(u);
        let mut count = 0u64;
        for edge in own.iter()? {
            let v = edge?.neighbor;
            if v <= u || v as usize >= graph.node_count() {
                continue;
            }
            own.intersect_with(&graph.neighbors(v), |_, _, w| {
                if w > v {
                    count += 1;
                }
            })?;
        }
        Ok(count)
    });
    per_vertex.into_iter().sum()
}

/// Sizes of the compressed graph against a plain CSR layout with `usize`
/// offsets and `u32` targets (plus `i32` weights when weighted).
pub fn compression_stats(graph: &CompressedGraph) -> CompressionStats {
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let offsets_size = (node_count + 1) * core::mem::size_of::<usize>();
    let per_edge = if graph.weighting().is_weighted() {
        core::mem::size_of::<VertexId>() + core::mem::size_of::<crate::Weight>()
    } else {
        core::mem::size_of::<VertexId>()
    };
    let degrees_size = node_count * core::mem::size_of::<u32>();

    CompressionStats {
        original_size: offsets_size + edge_count * per_edge,
        compressed_size: offsets_size + degrees_size + graph.byte_len(),
        node_count,
        edge_count,
    }
}

/// Compression statistics for analysis and optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    /// Plain CSR size in bytes.
    pub original_size: usize,
    /// Compressed size in bytes, including offsets and degrees.
    pub compressed_size: usize,
    /// Number of nodes.
    pub node_count: usize,
    /// Number of live edges.
    pub edge_count: usize,
}

impl CompressionStats {
    /// Returns the compression ratio (higher is better).
    #[inline]
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            0.0
        } else {
            self.original_size as f64 / self.compressed_size as f64
        }
    }

    /// Returns memory savings as a percentage; negative when the compressed
    /// form is larger.
    #[inline]
    pub fn memory_savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            let diff = self.original_size as f64 - self.compressed_size as f64;
            diff / self.original_size as f64 * 100.0
        }
    }
}
