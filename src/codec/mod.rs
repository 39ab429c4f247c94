//! Byte-level building blocks of a compressed stream.
//!
//! - `cursor`: bounds-checked byte and little-endian word access
//! - `varint`: the signed and unsigned variable-length integer shapes
//! - `layout`: stream header, block offset table and block lookup

pub mod cursor;
pub mod layout;
pub mod varint;

pub use layout::{BlockInfo, BlockLayout, Weighting};
