//! Encoding sorted neighbor lists into blocked streams.
//!
//! Encoding plans every block's byte size first, scans the sizes into block
//! offsets, then writes the blocks into disjoint regions of the buffer. Repack
//! reuses the same path, so a repacked stream is byte-for-byte what a fresh
//! encode of its live edges would produce.

use tracing::trace;

use super::{CompressedStream, Edge};
use crate::codec::cursor::ByteWriter;
use crate::codec::layout::{
    first_block_offset, write_block_offset, write_header, Weighting, BLOCK_HEADER_BYTES,
};
use crate::codec::varint;
use crate::concurrency::par;
use crate::config::CodecConfig;
use crate::error::{to_u32, CodecError, Result};
use crate::{VertexId, Weight};

/// Exact encoded size of `neighbors` (and `weights`, if given).
///
/// Callers that manage their own memory size the buffer with this and then
/// call [`encode_into`].
pub fn encoded_size(
    neighbors: &[VertexId],
    weights: Option<&[Weight]>,
    source: VertexId,
    config: &CodecConfig,
) -> Result<usize> {
    config.validate()?;
    let weighting = check_input(neighbors, weights)?;
    let degree = to_u32(neighbors.len())?;
    let plan = plan_blocks(source, degree, weighting, config, |i| edge_at(neighbors, weights, i));
    Ok(plan.total)
}

/// Encodes into a caller buffer and returns the number of bytes written.
///
/// Nothing is written unless the whole stream fits.
pub fn encode_into(
    buf: &mut [u8],
    neighbors: &[VertexId],
    weights: Option<&[Weight]>,
    source: VertexId,
    config: &CodecConfig,
) -> Result<usize> {
    config.validate()?;
    let weighting = check_input(neighbors, weights)?;
    let degree = to_u32(neighbors.len())?;
    write_stream(buf, source, degree, weighting, config, |i| edge_at(neighbors, weights, i))
}

/// Encodes into a freshly allocated, exactly sized buffer.
///
/// `neighbors` must be ascending (equal neighbors are allowed); `weights`, if
/// present, must have the same length and makes the stream weighted.
pub fn encode(
    neighbors: &[VertexId],
    weights: Option<&[Weight]>,
    source: VertexId,
    config: &CodecConfig,
) -> Result<CompressedStream> {
    let size = encoded_size(neighbors, weights, source, config)?;
    let mut bytes = vec![0u8; size].into_boxed_slice();
    let used = encode_into(&mut bytes, neighbors, weights, source, config)?;
    debug_assert_eq!(used, size);
    trace!(source, degree = neighbors.len(), bytes = size, "encoded stream");
    Ok(CompressedStream {
        bytes,
        source,
        degree: to_u32(neighbors.len())?,
        config: *config,
    })
}

fn check_input(neighbors: &[VertexId], weights: Option<&[Weight]>) -> Result<Weighting> {
    if let Some(pos) = neighbors.windows(2).position(|w| w[1] < w[0]) {
        return Err(CodecError::Unsorted { index: pos + 1 });
    }
    match weights {
        None => Ok(Weighting::Unweighted),
        Some(w) if w.len() == neighbors.len() => Ok(Weighting::Weighted),
        Some(w) => Err(CodecError::WeightCountMismatch {
            neighbors: neighbors.len(),
            weights: w.len(),
        }),
    }
}

#[inline]
fn edge_at(neighbors: &[VertexId], weights: Option<&[Weight]>, i: usize) -> Edge {
    Edge {
        neighbor: neighbors[i],
        weight: weights.map_or(0, |w| w[i]),
    }
}

/// Byte size of a run of edges encoded as one block's payload.
pub(crate) fn block_edges_len<I>(source: VertexId, edges: I, weighted: bool) -> usize
where
    I: IntoIterator<Item = Edge>,
{
    let mut prev: Option<VertexId> = None;
    let mut len = 0;
    for e in edges {
        len += match prev {
            None => varint::first_len(source, e.neighbor),
            Some(p) => varint::delta_len(e.neighbor - p),
        };
        if weighted {
            len += varint::weight_len(e.weight);
        }
        prev = Some(e.neighbor);
    }
    len
}

/// Writes a run of ascending edges as one block's payload.
pub(crate) fn write_block_edges<I>(
    w: &mut ByteWriter<'_>,
    source: VertexId,
    edges: I,
    weighted: bool,
) -> Result<()>
where
    I: IntoIterator<Item = Edge>,
{
    let mut prev: Option<VertexId> = None;
    for e in edges {
        match prev {
            None => varint::encode_first(w, source, e.neighbor)?,
            Some(p) => varint::encode_delta(w, e.neighbor - p)?,
        }
        if weighted {
            varint::encode_weight(w, e.weight)?;
        }
        prev = Some(e.neighbor);
    }
    Ok(())
}

/// Byte offsets of every block plus the total stream size.
pub(crate) struct BlockPlan {
    pub(crate) starts: Vec<usize>,
    pub(crate) total: usize,
}

pub(crate) fn plan_blocks<F>(
    source: VertexId,
    degree: u32,
    weighting: Weighting,
    config: &CodecConfig,
    edge_at: F,
) -> BlockPlan
where
    F: Fn(usize) -> Edge + Sync + Send,
{
    let num_blocks = config.num_blocks(degree);
    if num_blocks == 0 {
        return BlockPlan {
            starts: Vec::new(),
            total: 0,
        };
    }
    let cap = config.block_capacity as usize;
    let n = degree as usize;
    let weighted = weighting.is_weighted();
    let fork = config.fork_blocks(num_blocks);

    let sizes = par::map_indexed(num_blocks, fork, |b| {
        let range = b * cap..((b + 1) * cap).min(n);
        BLOCK_HEADER_BYTES + block_edges_len(source, range.map(&edge_at), weighted)
    });

    let mut starts = Vec::with_capacity(num_blocks);
    let mut offset = first_block_offset(num_blocks);
    for size in sizes {
        starts.push(offset);
        offset += size;
    }
    BlockPlan {
        starts,
        total: offset,
    }
}

/// Writes `degree` edges (fetched by `edge_at`) as a fresh stream whose
/// virtual degree equals `degree`. Returns the bytes used.
pub(crate) fn write_stream<F>(
    buf: &mut [u8],
    source: VertexId,
    degree: u32,
    weighting: Weighting,
    config: &CodecConfig,
    edge_at: F,
) -> Result<usize>
where
    F: Fn(usize) -> Edge + Sync + Send,
{
    let plan = plan_blocks(source, degree, weighting, config, &edge_at);
    if plan.total == 0 {
        return Ok(0);
    }
    if plan.total > buf.len() {
        return Err(CodecError::CapacityExceeded {
            needed: plan.total,
            available: buf.len(),
        });
    }

    write_header(buf, degree, weighting)?;
    for (block, &start) in plan.starts.iter().enumerate().skip(1) {
        write_block_offset(buf, block, start)?;
    }

    let cap = config.block_capacity as usize;
    let n = degree as usize;
    let weighted = weighting.is_weighted();
    let fork = config.fork_blocks(plan.starts.len());
    let regions = par::split_regions(&mut buf[..plan.total], &plan.starts);
    let written = par::map_owned(regions, fork, |b, region| -> Result<()> {
        let range = b * cap..((b + 1) * cap).min(n);
        let mut w = ByteWriter::at(region, 0);
        w.write_u32(to_u32(range.start)?)?;
        write_block_edges(&mut w, source, range.map(&edge_at), weighted)?;
        if w.remaining() != 0 {
            return Err(CodecError::invariant(b, "planned size disagrees with written size"));
        }
        Ok(())
    });
    for r in written {
        r?;
    }
    Ok(plan.total)
}
