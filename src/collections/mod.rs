//! Collections used by the codec's per-block work.

pub mod scratch;

pub use scratch::ScratchBuf;
