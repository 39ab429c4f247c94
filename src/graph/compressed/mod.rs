//! Compressed graph representations.

pub mod compressed_graph;

pub use compressed_graph::{CompressedGraph, CompressionStats};
