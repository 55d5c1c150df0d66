//! Bone-name assignment file
//!
//! Maps source node names to dense bone IDs: `u32` count followed by
//! fixed 128-byte NUL-padded names. A name's index is its bone ID.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::error::{AnimError, Result};

/// Fixed size of one stored name
pub const NAME_LENGTH: usize = 128;

/// Ordered bone names, indexed by bone ID
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoneNames {
    names: Vec<String>,
}

impl BoneNames {
    /// Create an empty assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an assignment from names in bone ID order
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut result = Self::new();
        for name in names {
            result.push(name)?;
        }
        Ok(result)
    }

    /// Append a name and return its bone ID
    pub fn push(&mut self, name: impl Into<String>) -> Result<u16> {
        let name = name.into();
        if name.is_empty() || name.len() > NAME_LENGTH || name.contains('\0') {
            return Err(AnimError::InvalidBoneName(name));
        }
        let id = u16::try_from(self.names.len()).map_err(|_| AnimError::TooMany {
            what: "bone names",
            count: self.names.len() + 1,
        })?;
        self.names.push(name);
        Ok(id)
    }

    /// Read an assignment file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_u32::<LittleEndian>()? as usize;
        let mut names = Vec::with_capacity(count.min(u16::MAX as usize + 1));
        let mut buf = [0u8; NAME_LENGTH];
        for _ in 0..count {
            reader.read_exact(&mut buf)?;
            let end = buf.iter().position(|&b| b == 0).unwrap_or(NAME_LENGTH);
            names.push(String::from_utf8_lossy(&buf[..end]).into_owned());
        }
        debug!("Read {} bone names", names.len());
        Ok(Self { names })
    }

    /// Parse an assignment file from a buffer
    pub fn parse(data: &[u8]) -> Result<Self> {
        let needed = data
            .get(..4)
            .map(|count| u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize)
            .map(|count| 4 + count * NAME_LENGTH)
            .unwrap_or(4);
        if data.len() < needed {
            return Err(AnimError::UnexpectedEof {
                offset: 0,
                needed,
                len: data.len(),
            });
        }
        let mut slice = data;
        Self::read(&mut slice)
    }

    /// Write an assignment file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.names.len() as u32)?;
        for name in &self.names {
            let mut buf = [0u8; NAME_LENGTH];
            buf[..name.len()].copy_from_slice(name.as_bytes());
            writer.write_all(&buf)?;
        }
        Ok(())
    }

    /// Bone ID of `name`, if assigned
    pub fn find(&self, name: &str) -> Option<u16> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|index| index as u16)
    }

    /// Bone ID of `name`, or an error naming the missing bone
    pub fn require(&self, name: &str) -> Result<u16> {
        self.find(name)
            .ok_or_else(|| AnimError::UnknownBoneName(name.to_string()))
    }

    /// Name of a bone
    pub fn name(&self, bone_id: u16) -> Option<&str> {
        self.names.get(bone_id as usize).map(String::as_str)
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are assigned
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in bone ID order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
