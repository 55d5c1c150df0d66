use byteorder::{ByteOrder, LittleEndian};

use crate::error::{AnimError, Result};

/// Bounds-checked little-endian cursor over a borrowed buffer
///
/// Slices handed out by [`ByteReader::take`] borrow from the source buffer,
/// not from the reader, so they can outlive it.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at a section offset taken from a header
    pub fn at(data: &'a [u8], offset: usize, section: &'static str) -> Result<Self> {
        if offset > data.len() {
            return Err(AnimError::InvalidOffset {
                section,
                offset,
                len: data.len(),
            });
        }
        Ok(Self { data, pos: offset })
    }

    /// Current position from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(AnimError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                len: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.take(4).map(LittleEndian::read_f32)
    }
}
