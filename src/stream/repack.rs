//! Repack: rebuilding block boundaries after heavy packing.

use tracing::debug;

use super::encode::write_stream;
use super::CompressedNeighborsMut;
use crate::codec::cursor::{write_word, WORD};
use crate::error::{to_u32, CodecError, Result};

impl CompressedNeighborsMut<'_> {
    /// Rewrites the stream as a fresh encoding of its live edges, so that
    /// `virtual_degree == degree` and blocks are full again.
    ///
    /// Live edges are first decoded into a temporary buffer; block sizes and
    /// offsets are then planned in full before the first byte is written.
    /// The result is byte-identical to encoding the live edges from scratch.
    ///
    /// Moving block boundaries turns some source-relative first edges into
    /// gaps and vice versa, so the rebuilt stream is not always smaller. When
    /// only a few edges were packed out it can need more bytes than the
    /// buffer holds; that returns [`CodecError::CapacityExceeded`] and leaves
    /// the stream as it was. The automatic repack in
    /// [`pack`](Self::pack) waits until the live degree is below
    /// `virtual_degree / repack_divisor`, so with the default divisor most of
    /// the old encoding is free by then.
    ///
    /// Live neighbors that decrease across a block boundary (a corrupted
    /// stream) are reported as [`CodecError::InvariantViolation`] before
    /// anything is written.
    pub fn repack(&mut self) -> Result<()> {
        let live = self.degree;
        if live == 0 {
            // Clearing the virtual degree marks the buffer as an empty stream.
            if self.bytes.len() >= WORD {
                write_word(self.bytes, 0, 0)?;
            }
            debug!(source = self.source, "repacked to an empty stream");
            return Ok(());
        }

        let view = self.as_neighbors();
        let layout = view.layout()?;
        let weighting = layout.weighting();
        let old_virtual_degree = layout.virtual_degree();
        let edges = view.to_vec()?;
        if let Some(pos) = edges.windows(2).position(|w| w[1].neighbor < w[0].neighbor) {
            let index = pos + 1;
            let block = layout.locate_block(to_u32(index)?)?;
            return Err(CodecError::invariant(
                block,
                format!("neighbor {} at index {index} decreases", edges[index].neighbor),
            ));
        }

        let used = write_stream(self.bytes, self.source, live, weighting, &self.config, |i| {
            edges[i]
        })?;
        debug!(
            source = self.source,
            old_virtual_degree,
            virtual_degree = live,
            bytes = used,
            "repacked stream"
        );
        Ok(())
    }
}
