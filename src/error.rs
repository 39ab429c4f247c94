//! Error type shared by every codec operation.
//!
//! Every variant is a caller or programmer error: a stream produced by
//! [`encode`](crate::stream::encode) and mutated only through this crate never
//! yields one. They exist so that a bad buffer fails loudly instead of
//! producing a malformed stream.

use thiserror::Error;

/// Errors reported by the compressed adjacency codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A write would run past the end of the caller's buffer.
    #[error("buffer too small: {needed} bytes needed, {available} available")]
    CapacityExceeded {
        /// Bytes the operation needs.
        needed: usize,
        /// Bytes the buffer holds.
        available: usize,
    },

    /// A read ran past the end of the buffer.
    #[error("stream truncated at byte offset {offset}")]
    Truncated {
        /// Offset of the first missing byte.
        offset: usize,
    },

    /// A varint did not terminate within the width of its target type.
    #[error("malformed varint at byte offset {offset}")]
    MalformedVarint {
        /// Offset where the varint starts.
        offset: usize,
    },

    /// Neighbor ids handed to the encoder were not in ascending order.
    #[error("neighbor list decreases at position {index}")]
    Unsorted {
        /// Position of the first out-of-order neighbor.
        index: usize,
    },

    /// A weighted encode received a weight slice of the wrong length.
    #[error("{neighbors} neighbors but {weights} weights")]
    WeightCountMismatch {
        /// Number of neighbors.
        neighbors: usize,
        /// Number of weights.
        weights: usize,
    },

    /// A degree or byte offset does not fit in the 32-bit header fields.
    #[error("value {degree} does not fit in a 32-bit header field")]
    DegreeOverflow {
        /// The offending value.
        degree: usize,
    },

    /// Random access past the live degree.
    #[error("index {index} out of range for degree {degree}")]
    IndexOutOfRange {
        /// Requested logical index.
        index: usize,
        /// Live degree of the stream.
        degree: usize,
    },

    /// A block's contents disagree with the layout recorded in the header.
    #[error("block {block}: {detail}")]
    InvariantViolation {
        /// Block id.
        block: usize,
        /// What was found.
        detail: String,
    },

    /// The header or offset table is inconsistent with the buffer.
    #[error("corrupt header: {detail}")]
    CorruptHeader {
        /// What was found.
        detail: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CodecError>;

impl CodecError {
    pub(crate) fn invariant(block: usize, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            block,
            detail: detail.into(),
        }
    }

    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptHeader {
            detail: detail.into(),
        }
    }
}

/// Converts a length or offset into a `u32` header field.
#[inline]
pub(crate) fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| CodecError::DegreeOverflow { degree: value })
}
