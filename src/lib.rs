//! # `packedgraph` - Compressed Adjacency Streams
//!
//! Stores each vertex's sorted neighbor list as a delta-encoded byte stream
//! split into fixed-capacity blocks, decodes blocks in parallel, and filters
//! edges out in place without reallocating.
//!
//! ## Layout
//!
//! A stream starts with a small header (the *virtual degree*, a weighted
//! flag and a table of block offsets) followed by blocks of at most
//! [`CodecConfig::block_capacity`] edges. Each block records the logical index
//! of its first edge, so any block can be decoded, filtered or rewritten
//! without looking at its neighbors. See [`codec::layout`].
//!
//! ## Lifecycle
//!
//! 1. [`encode`] compresses a sorted neighbor list into an owned
//!    [`CompressedStream`], or [`encode_into`] writes into caller memory.
//! 2. [`CompressedNeighbors`] decodes: [`decode`](CompressedNeighbors::decode),
//!    [`map_reduce`](CompressedNeighbors::map_reduce),
//!    [`filter`](CompressedNeighbors::filter),
//!    [`get_ith_neighbor`](CompressedNeighbors::get_ith_neighbor) and
//!    [`intersect`].
//! 3. [`CompressedNeighborsMut::pack`] removes edges in place; once the live
//!    degree drops far enough below the virtual degree it calls
//!    [`repack`](CompressedNeighborsMut::repack), which rebuilds the blocks.
//!
//! The codec owns no memory of its own: views borrow a caller's buffer and the
//! caller tracks the live degree.
//!
//! ## Concurrency
//!
//! With the `parallel` feature (on by default) block work forks through
//! rayon. Each task gets its block's bytes as a disjoint `&mut [u8]`, so
//! concurrent writers cannot alias by construction.
//!
//! ## Example
//!
//! ```rust
//! use packedgraph::{encode, CodecConfig, Edge};
//!
//! let config = CodecConfig::with_block_capacity(2);
//! let mut stream = encode(&[5, 10, 10000, 10005], Some(&[1, -2, 3, -4]), 7, &config)?;
//!
//! let degree = stream.pack(|_, neighbor, _| neighbor % 2 == 0)?;
//! assert_eq!(degree, 2);
//! assert_eq!(
//!     stream.as_neighbors().to_vec()?,
//!     vec![Edge::new(10, -2), Edge::new(10000, 3)]
//! );
//! # Ok::<(), packedgraph::CodecError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod codec;
pub mod collections;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod stream;

#[cfg(feature = "proptest")]
pub mod strategies;

/// Vertex identifier.
pub type VertexId = u32;

/// Edge weight.
pub type Weight = i32;

pub use codec::Weighting;
pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use graph::{CompressedGraph, CompressionStats};
pub use stream::{
    encode, encode_into, encoded_size, intersect, intersect_with, CompressedNeighbors,
    CompressedNeighborsMut, CompressedStream, Edge, Monoid, NeighborIter, StreamSummary,
};

// Compile-time layout checks.
const _: () = {
    use core::mem;

    assert!(mem::size_of::<Edge>() == 8);
    assert!(codec::layout::HEADER_BYTES == 5);
    assert!(codec::layout::BLOCK_HEADER_BYTES == mem::size_of::<u32>());
};
