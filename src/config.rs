//! Codec configuration.
//!
//! A [`CodecConfig`] is fixed for the lifetime of a graph: every stream of the
//! graph must be read with the same `block_capacity` it was written with.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Default number of edges per block.
pub const DEFAULT_BLOCK_CAPACITY: u32 = 1000;

/// Tunables for encoding, decoding and compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum edges per block; the unit of parallel work.
    pub block_capacity: u32,
    /// `pack` repacks when the live degree drops below
    /// `virtual_degree / repack_divisor`. Zero disables automatic repacking.
    pub repack_divisor: u32,
    /// Allow fork-join over blocks. Has no effect without the `parallel` feature.
    pub parallel: bool,
    /// Decode forks only when the stream has more than this many blocks.
    pub parallel_block_threshold: u32,
    /// `filter` makes a single sequential pass at or below this degree.
    pub filter_sequential_threshold: u32,
    /// Chunked `filter` stages `degree / filter_chunk_divisor` edges per round.
    pub filter_chunk_divisor: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            repack_divisor: 10,
            parallel: true,
            parallel_block_threshold: 2,
            filter_sequential_threshold: 10_000,
            filter_chunk_divisor: 10,
        }
    }
}

impl CodecConfig {
    /// Default configuration with a different block capacity.
    pub fn with_block_capacity(block_capacity: u32) -> Self {
        Self {
            block_capacity,
            ..Self::default()
        }
    }

    /// Returns a copy that never forks.
    pub fn sequential(self) -> Self {
        Self {
            parallel: false,
            ..self
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if self.block_capacity == 0 {
            return Err(CodecError::InvalidConfig(
                "block_capacity must be at least 1".into(),
            ));
        }
        if self.filter_chunk_divisor == 0 {
            return Err(CodecError::InvalidConfig(
                "filter_chunk_divisor must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of blocks for a stream of the given virtual degree.
    #[inline]
    pub fn num_blocks(&self, virtual_degree: u32) -> usize {
        if virtual_degree == 0 {
            0
        } else {
            virtual_degree.div_ceil(self.block_capacity.max(1)) as usize
        }
    }

    /// Whether a stream packed down to `live` edges should be repacked.
    #[inline]
    pub fn should_repack(&self, live: u32, virtual_degree: u32) -> bool {
        self.repack_divisor != 0 && live < virtual_degree / self.repack_divisor
    }

    #[inline]
    pub(crate) fn fork_blocks(&self, num_blocks: usize) -> bool {
        self.parallel && num_blocks > self.parallel_block_threshold as usize
    }
}
