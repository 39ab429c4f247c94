//! `proptest` strategies for neighbor lists and codec configurations.
//!
//! Enabled by the `proptest` feature for crates that test code built on the
//! codec.

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

use crate::config::CodecConfig;
use crate::{VertexId, Weight};

/// Strictly ascending neighbor ids below `max_id`, up to `max_len` of them.
pub fn sorted_neighbors(max_id: VertexId, max_len: usize) -> impl Strategy<Value = Vec<VertexId>> {
    btree_set(0..max_id.max(1), 0..=max_len).prop_map(|set| set.into_iter().collect())
}

/// Ascending neighbor ids paired with arbitrary weights.
pub fn weighted_neighbors(
    max_id: VertexId,
    max_len: usize,
) -> impl Strategy<Value = (Vec<VertexId>, Vec<Weight>)> {
    sorted_neighbors(max_id, max_len).prop_flat_map(|ids| {
        let n = ids.len();
        (Just(ids), vec(any::<Weight>(), n))
    })
}

/// Configurations with small block capacities, so short lists span many
/// blocks.
pub fn small_block_config() -> impl Strategy<Value = CodecConfig> {
    (1u32..=16, any::<bool>()).prop_map(|(capacity, parallel)| CodecConfig {
        parallel,
        ..CodecConfig::with_block_capacity(capacity)
    })
}
