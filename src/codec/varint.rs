//! Variable-length integers with a continuation bit.
//!
//! Two shapes are used:
//!
//! - **signed**: the first byte carries 6 data bits, a sign bit (`0x40`) and a
//!   continuation bit (`0x80`); later bytes carry 7 data bits each. Used for the
//!   first neighbor of a block (as a delta from the source) and for weights (as
//!   a delta from zero).
//! - **unsigned**: 7 data bits per byte plus continuation. Used for the gap to
//!   the previous neighbor.
//!
//! Data bits are little-endian: the low bits of the magnitude come first.

use crate::codec::cursor::{ByteReader, ByteWriter};
use crate::error::{CodecError, Result};
use crate::{VertexId, Weight};

const CONTINUE: u8 = 0x80;
const SIGN: u8 = 0x40;
const FIRST_DATA: u8 = 0x3f;
const DATA: u8 = 0x7f;
const FIRST_BITS: u32 = 6;
const BITS: u32 = 7;

/// Last shift a signed encoding may reach; covers any 32-bit magnitude.
const MAX_SIGNED_SHIFT: u32 = FIRST_BITS + 4 * BITS;
/// Last shift an unsigned encoding may reach; five bytes.
const MAX_UNSIGNED_SHIFT: u32 = 4 * BITS;

/// Writes `value` in the signed shape.
pub fn encode_signed(w: &mut ByteWriter<'_>, value: i64) -> Result<()> {
    let mut rest = value.unsigned_abs();
    let mut first = (rest as u8) & FIRST_DATA;
    if value < 0 {
        first |= SIGN;
    }
    rest >>= FIRST_BITS;
    if rest > 0 {
        first |= CONTINUE;
    }
    w.write_u8(first)?;
    while rest > 0 {
        let mut b = (rest as u8) & DATA;
        rest >>= BITS;
        if rest > 0 {
            b |= CONTINUE;
        }
        w.write_u8(b)?;
    }
    Ok(())
}

/// Writes `delta` in the unsigned shape. Zero takes one byte.
pub fn encode_delta(w: &mut ByteWriter<'_>, delta: u32) -> Result<()> {
    let mut rest = delta;
    loop {
        let mut b = (rest as u8) & DATA;
        rest >>= BITS;
        if rest > 0 {
            b |= CONTINUE;
        }
        w.write_u8(b)?;
        if rest == 0 {
            return Ok(());
        }
    }
}

/// Writes the first neighbor of a block as a signed delta from `source`.
#[inline]
pub fn encode_first(w: &mut ByteWriter<'_>, source: VertexId, neighbor: VertexId) -> Result<()> {
    encode_signed(w, i64::from(neighbor) - i64::from(source))
}

/// Writes a weight as a signed delta from zero.
#[inline]
pub fn encode_weight(w: &mut ByteWriter<'_>, weight: Weight) -> Result<()> {
    encode_signed(w, i64::from(weight))
}

/// Reads a value in the signed shape.
pub fn decode_signed(r: &mut ByteReader<'_>) -> Result<i64> {
    let start = r.position();
    let first = r.read_u8()?;
    let mut magnitude = u64::from(first & FIRST_DATA);
    if first & CONTINUE != 0 {
        let mut shift = FIRST_BITS;
        loop {
            if shift > MAX_SIGNED_SHIFT {
                return Err(CodecError::MalformedVarint { offset: start });
            }
            let b = r.read_u8()?;
            magnitude |= u64::from(b & DATA) << shift;
            if b & CONTINUE == 0 {
                break;
            }
            shift += BITS;
        }
    }
    // Bounded by the shift limit, so the cast is lossless.
    let magnitude = magnitude as i64;
    Ok(if first & SIGN != 0 { -magnitude } else { magnitude })
}

/// Reads a value in the unsigned shape.
pub fn decode_delta(r: &mut ByteReader<'_>) -> Result<u32> {
    let start = r.position();
    let mut value = 0u64;
    let mut shift = 0;
    loop {
        if shift > MAX_UNSIGNED_SHIFT {
            return Err(CodecError::MalformedVarint { offset: start });
        }
        let b = r.read_u8()?;
        value |= u64::from(b & DATA) << shift;
        if b & CONTINUE == 0 {
            break;
        }
        shift += BITS;
    }
    u32::try_from(value).map_err(|_| CodecError::MalformedVarint { offset: start })
}

/// Reads a block's first neighbor, stored as a signed delta from `source`.
#[inline]
pub fn decode_first(r: &mut ByteReader<'_>, source: VertexId) -> Result<VertexId> {
    let start = r.position();
    let delta = decode_signed(r)?;
    VertexId::try_from(i64::from(source) + delta)
        .map_err(|_| CodecError::MalformedVarint { offset: start })
}

/// Reads a weight.
#[inline]
pub fn decode_weight(r: &mut ByteReader<'_>) -> Result<Weight> {
    let start = r.position();
    let value = decode_signed(r)?;
    Weight::try_from(value).map_err(|_| CodecError::MalformedVarint { offset: start })
}

/// Encoded length of `value` in the signed shape.
#[inline]
pub fn signed_len(value: i64) -> usize {
    let rest = value.unsigned_abs() >> FIRST_BITS;
    1 + significant_groups(rest)
}

/// Encoded length of `delta` in the unsigned shape.
#[inline]
pub fn delta_len(delta: u32) -> usize {
    significant_groups(u64::from(delta)).max(1)
}

/// Encoded length of a first neighbor.
#[inline]
pub fn first_len(source: VertexId, neighbor: VertexId) -> usize {
    signed_len(i64::from(neighbor) - i64::from(source))
}

/// Encoded length of a weight.
#[inline]
pub fn weight_len(weight: Weight) -> usize {
    signed_len(i64::from(weight))
}

/// Number of 7-bit groups needed for `v` (zero for zero).
#[inline]
fn significant_groups(v: u64) -> usize {
    let bits = (u64::BITS - v.leading_zeros()) as usize;
    bits.div_ceil(BITS as usize)
}
