//! Bounded byte sinks and sources used by a single encode or decode call.

use crate::error::{Error, Result};

/// Destination for encoded bytes.
///
/// A sink either accepts a whole chunk or rejects it without writing any
/// part of it.
pub trait Writer {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}

impl Writer for Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}

// ── SliceWriter ────────────────────────────────────────────────────────────

/// Writes into a caller-owned buffer, refusing to cross its end.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl Writer for SliceWriter<'_> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self
            .pos
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::BufferTooSmall {
                offset: self.pos,
                requested: bytes.len(),
                capacity: self.buf.len(),
            })?;
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

// ── SizeCounter ────────────────────────────────────────────────────────────

/// Counts bytes instead of storing them. Driving the serializer with this
/// sink computes the exact encoded size of a value.
#[derive(Debug, Default)]
pub struct SizeCounter {
    total: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl Writer for SizeCounter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.total = self
            .total
            .checked_add(bytes.len())
            .ok_or(Error::SizeOverflow {
                total: self.total,
                requested: bytes.len(),
            })?;
        Ok(())
    }
}

// ── SliceReader ────────────────────────────────────────────────────────────

/// Reads from a borrowed byte slice, maintaining a cursor position.
#[derive(Debug, Clone)]
pub struct SliceReader<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> SliceReader<'de> {
    pub fn new(input: &'de [u8]) -> Self {
        SliceReader { input, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unconsumed portion of the input.
    pub fn remaining(&self) -> &'de [u8] {
        &self.input[self.pos..]
    }

    /// Consume exactly `n` bytes. Fails with `UnexpectedEndOfInput`
    /// without moving the cursor.
    pub fn take(&mut self, n: usize) -> Result<&'de [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.input.len())
            .ok_or(Error::UnexpectedEndOfInput)?;
        let slice = &self.input[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }
}
