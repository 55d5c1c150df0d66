//! Skinned mesh header
//!
//! Only the header is decoded. Draw, vertex and index data are left to the
//! renderer; the header is needed to find the embedded bind pose.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::bind_pose::read_bind_pose;
use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;

/// Counts and section offsets at the start of a skinned mesh file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshHeader {
    pub draw_count: u16,
    pub mesh_count: u16,
    pub material_count: u16,
    pub texture_count: u16,
    /// Absolute offset of the vertex data
    pub vertex_start: u32,
    /// Absolute offset of the index data
    pub index_start: u32,
    /// Absolute offset of the bind-pose section
    pub pose_start: u32,
}

impl MeshHeader {
    /// Header size in bytes
    pub const SIZE: usize = 20;

    /// Read a header from a reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            draw_count: reader.read_u16::<LittleEndian>()?,
            mesh_count: reader.read_u16::<LittleEndian>()?,
            material_count: reader.read_u16::<LittleEndian>()?,
            texture_count: reader.read_u16::<LittleEndian>()?,
            vertex_start: reader.read_u32::<LittleEndian>()?,
            index_start: reader.read_u32::<LittleEndian>()?,
            pose_start: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Parse the header at the start of a mesh buffer
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(AnimError::UnexpectedEof {
                offset: 0,
                needed: Self::SIZE,
                len: data.len(),
            });
        }
        let mut slice = data;
        Self::read(&mut slice)
    }

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.draw_count)?;
        writer.write_u16::<LittleEndian>(self.mesh_count)?;
        writer.write_u16::<LittleEndian>(self.material_count)?;
        writer.write_u16::<LittleEndian>(self.texture_count)?;
        writer.write_u32::<LittleEndian>(self.vertex_start)?;
        writer.write_u32::<LittleEndian>(self.index_start)?;
        writer.write_u32::<LittleEndian>(self.pose_start)?;
        Ok(())
    }
}

/// Read the header of a skinned mesh and the bind pose it points to
pub fn read_mesh_bind_pose(data: &[u8]) -> Result<(MeshHeader, BindPose)> {
    let header = MeshHeader::parse(data)?;
    let pose = read_bind_pose(data, header.pose_start as usize)?;
    Ok((header, pose))
}
