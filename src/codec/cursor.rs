//! Bounds-checked byte cursors.
//!
//! Header words are little-endian `u32`s read and written through
//! `zerocopy`'s unaligned byte-order types, so a short buffer surfaces as
//! [`CodecError::Truncated`] or [`CodecError::CapacityExceeded`] instead of an
//! out-of-bounds access.

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{AsBytes, FromBytes};

use crate::error::{CodecError, Result};

/// Width of a header word in bytes.
pub const WORD: usize = core::mem::size_of::<u32>();

type WordLe = U32<LittleEndian>;

/// Reads the header word at `pos`.
#[inline]
pub fn read_word(bytes: &[u8], pos: usize) -> Result<u32> {
    bytes
        .get(pos..)
        .and_then(WordLe::read_from_prefix)
        .map(|w| w.get())
        .ok_or(CodecError::Truncated {
            offset: pos.min(bytes.len()),
        })
}

/// Writes a header word at `pos`.
#[inline]
pub fn write_word(bytes: &mut [u8], pos: usize, value: u32) -> Result<()> {
    let available = bytes.len();
    bytes
        .get_mut(pos..)
        .and_then(|dst| WordLe::new(value).write_to_prefix(dst))
        .ok_or(CodecError::CapacityExceeded {
            needed: pos + WORD,
            available,
        })
}

/// Forward-only reader over an encoded stream.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Starts reading `bytes` at `pos`.
    #[inline]
    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(CodecError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a little-endian header word.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let v = read_word(self.bytes, self.pos)?;
        self.pos += WORD;
        Ok(v)
    }
}

/// Forward-only writer into a caller-provided buffer.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    bytes: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Starts writing into `bytes` at `pos`.
    #[inline]
    pub fn at(bytes: &'a mut [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Writes one byte.
    #[inline]
    pub fn write_u8(&mut self, b: u8) -> Result<()> {
        let available = self.bytes.len();
        let slot = self
            .bytes
            .get_mut(self.pos)
            .ok_or(CodecError::CapacityExceeded {
                needed: self.pos + 1,
                available,
            })?;
        *slot = b;
        self.pos += 1;
        Ok(())
    }

    /// Writes a little-endian header word.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        write_word(self.bytes, self.pos, value)?;
        self.pos += WORD;
        Ok(())
    }
}
