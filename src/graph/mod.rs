//! Graph container built on the codec.
//!
//! The container plays the part of an outer algorithm: it owns one buffer for
//! all streams, tracks live degrees, and drives decode, pack and intersect
//! the way traversals and triangle counting do.

pub mod compressed;

pub use compressed::compressed_graph::{bfs, compression_stats, triangle_count};
pub use compressed::{CompressedGraph, CompressionStats};
