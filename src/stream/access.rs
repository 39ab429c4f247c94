//! Random access and sorted intersection.

use core::cmp::Ordering;

use super::decode::BlockReader;
use super::{CompressedNeighbors, Edge};
use crate::error::{CodecError, Result};
use crate::VertexId;

impl CompressedNeighbors<'_> {
    /// The edge at logical position `index`.
    ///
    /// Binary-searches the owning block, then replays its deltas up to
    /// `index`.
    pub fn get_ith_neighbor(&self, index: usize) -> Result<Edge> {
        let out_of_range = CodecError::IndexOutOfRange {
            index,
            degree: self.degree as usize,
        };
        let Ok(target) = u32::try_from(index) else {
            return Err(out_of_range);
        };
        if target >= self.degree {
            return Err(out_of_range);
        }
        let layout = self.layout()?;
        let block = layout.locate_block(target)?;
        let info = layout.block(block)?;
        let mut reader = BlockReader::new(&layout, &info, self.source);
        while let Some((at, edge)) = reader.next_edge()? {
            if at == index {
                return Ok(edge);
            }
        }
        Err(CodecError::invariant(block, format!("index {index} not inside block")))
    }

    /// Number of neighbor ids shared with `other`.
    pub fn intersect(&self, other: &CompressedNeighbors<'_>) -> Result<usize> {
        self.intersect_with(other, |_, _, _| {})
    }

    /// Merges the two neighbor lists and calls `f(self.source, other.source,
    /// shared)` for every common id. Returns the number of calls.
    pub fn intersect_with<F>(&self, other: &CompressedNeighbors<'_>, mut f: F) -> Result<usize>
    where
        F: FnMut(VertexId, VertexId, VertexId),
    {
        let mut left = self.walk()?;
        let mut right = other.walk()?;
        let mut a = left.next_edge()?;
        let mut b = right.next_edge()?;
        let mut shared = 0;
        while let (Some(x), Some(y)) = (a, b) {
            match x.neighbor.cmp(&y.neighbor) {
                Ordering::Less => a = left.next_edge()?,
                Ordering::Greater => b = right.next_edge()?,
                Ordering::Equal => {
                    f(self.source, other.source, x.neighbor);
                    shared += 1;
                    a = left.next_edge()?;
                    b = right.next_edge()?;
                }
            }
        }
        Ok(shared)
    }
}

/// Size of the intersection of two neighbor lists.
pub fn intersect(a: &CompressedNeighbors<'_>, b: &CompressedNeighbors<'_>) -> Result<usize> {
    a.intersect(b)
}

/// Calls `f(a.source, b.source, shared)` for every neighbor id in both lists
/// and returns how many there were.
pub fn intersect_with<F>(
    a: &CompressedNeighbors<'_>,
    b: &CompressedNeighbors<'_>,
    f: F,
) -> Result<usize>
where
    F: FnMut(VertexId, VertexId, VertexId),
{
    a.intersect_with(b, f)
}
