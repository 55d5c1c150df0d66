//! Animation clip file format
//!
//! ```text
//! 0:  u32 percentages section start
//! 4:  u32 values section start
//! 8:  f32 duration (seconds)
//! 12: u16 animated bone count
//! 14: u16 padding
//! 16: bone table, 8 bytes per bone:
//!     u16 bone ID, u16 translation keys, u16 rotation keys, u16 scale keys
//! percentages section, per bone: f32[T] f32[R] f32[S]
//! values section, per bone: vec3[T] quat[R] vec3[S]
//! ```

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Quat, Vec3};
use log::{debug, trace, warn};

use super::reader::ByteReader;
use crate::clip::{AnimationClip, AnimationClipData, BoneAnimation, BoneAnimationData};
use crate::error::{AnimError, Result};
use crate::timeline::{Timeline, TimelineData, Track};
use crate::types::{Channel, ChannelFlags, KeyValue};

/// Fixed-size clip header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationHeader {
    pub percentages_start: u32,
    pub values_start: u32,
    pub duration: f32,
    pub bone_count: u16,
}

impl AnimationHeader {
    /// Header size in bytes, padding included
    pub const SIZE: usize = 16;

    /// Parse the header at the start of a clip buffer
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let percentages_start = reader.read_u32()?;
        let values_start = reader.read_u32()?;
        let duration = reader.read_f32()?;
        let bone_count = reader.read_u16()?;
        let _padding = reader.read_u16()?;

        Ok(Self {
            percentages_start,
            values_start,
            duration,
            bone_count,
        })
    }

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.percentages_start)?;
        writer.write_u32::<LittleEndian>(self.values_start)?;
        writer.write_f32::<LittleEndian>(self.duration)?;
        writer.write_u16::<LittleEndian>(self.bone_count)?;
        writer.write_u16::<LittleEndian>(0)?;
        Ok(())
    }
}

/// One row of the bone table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoneEntry {
    pub bone_id: u16,
    pub translation_count: u16,
    pub rotation_count: u16,
    pub scale_count: u16,
}

impl BoneEntry {
    /// Entry size in bytes
    pub const SIZE: usize = 8;

    fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            bone_id: reader.read_u16()?,
            translation_count: reader.read_u16()?,
            rotation_count: reader.read_u16()?,
            scale_count: reader.read_u16()?,
        })
    }

    /// Write the entry
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.bone_id)?;
        writer.write_u16::<LittleEndian>(self.translation_count)?;
        writer.write_u16::<LittleEndian>(self.rotation_count)?;
        writer.write_u16::<LittleEndian>(self.scale_count)?;
        Ok(())
    }

    /// Channels with at least one key
    pub fn flags(&self) -> ChannelFlags {
        ChannelFlags::from_counts(
            self.translation_count as usize,
            self.rotation_count as usize,
            self.scale_count as usize,
        )
    }

    /// Bytes this bone occupies in the percentages section
    pub fn percentages_size(&self) -> usize {
        (self.translation_count as usize + self.rotation_count as usize + self.scale_count as usize)
            * 4
    }

    /// Bytes this bone occupies in the values section
    pub fn values_size(&self) -> usize {
        self.translation_count as usize * Vec3::SIZE
            + self.rotation_count as usize * Quat::SIZE
            + self.scale_count as usize * Vec3::SIZE
    }
}

/// Parse a clip into a zero-copy view
pub fn read_clip(data: &[u8]) -> Result<AnimationClip<'_>> {
    let header = AnimationHeader::parse(data)?;

    let mut table = ByteReader::at(data, AnimationHeader::SIZE, "bone table")?;
    let entries = (0..header.bone_count)
        .map(|_| BoneEntry::read(&mut table))
        .collect::<Result<Vec<_>>>()?;

    let mut percentages = ByteReader::at(data, header.percentages_start as usize, "percentages")?;
    let mut values = ByteReader::at(data, header.values_start as usize, "values")?;

    let mut bones = Vec::with_capacity(entries.len());
    for entry in &entries {
        let bone = BoneAnimation {
            bone_id: entry.bone_id,
            flags: entry.flags(),
            translations: read_timeline(&mut percentages, &mut values, entry.translation_count)?,
            rotations: read_timeline(&mut percentages, &mut values, entry.rotation_count)?,
            scales: read_timeline(&mut percentages, &mut values, entry.scale_count)?,
        };
        check_sorted(entry.bone_id, Channel::Translation, &bone.translations)?;
        check_sorted(entry.bone_id, Channel::Rotation, &bone.rotations)?;
        check_sorted(entry.bone_id, Channel::Scale, &bone.scales)?;
        trace!(
            "Bone {}: {} translation, {} rotation, {} scale keys",
            entry.bone_id, entry.translation_count, entry.rotation_count, entry.scale_count
        );
        bones.push(bone);
    }

    if !entries.windows(2).all(|w| w[0].bone_id < w[1].bone_id) {
        warn!("Animated bones are not sorted by bone ID");
    }

    let clip = AnimationClip {
        duration: header.duration,
        bones,
    };
    debug!(
        "Loaded animation: {:.3}s, {} bones, {} keys (percentages at {}, values at {})",
        clip.duration,
        clip.bone_count(),
        clip.key_count(),
        header.percentages_start,
        header.values_start
    );
    Ok(clip)
}

fn read_timeline<'a, T: KeyValue>(
    percentages: &mut ByteReader<'a>,
    values: &mut ByteReader<'a>,
    count: u16,
) -> Result<Timeline<'a, T>> {
    let count = count as usize;
    let p = percentages.take(count * 4)?;
    let v = values.take(count * T::SIZE)?;
    Ok(Timeline::new(p, v, count))
}

fn check_sorted<T: KeyValue>(bone: u16, channel: Channel, timeline: &Timeline<'_, T>) -> Result<()> {
    if !timeline.is_sorted() {
        return Err(AnimError::UnsortedKeyframes {
            bone,
            channel: channel.name(),
        });
    }
    if let (Some(first), Some(last)) = (timeline.percentages().next(), timeline.percentages().last())
        && (first < -0.01 || last > 1.01)
    {
        warn!(
            "Bone {bone} {channel} keys span {first}..{last}, outside the clip's 0..1 range"
        );
    }
    Ok(())
}

/// Write a clip
///
/// The percentages section follows the bone table directly and the values
/// section follows the percentages.
pub fn write_clip<W: Write>(clip: &AnimationClipData, writer: &mut W) -> Result<()> {
    let bone_count = to_u16("animated bones", clip.bones.len())?;
    let entries = clip
        .bones
        .iter()
        .map(bone_entry)
        .collect::<Result<Vec<_>>>()?;

    let table_end = AnimationHeader::SIZE + entries.len() * BoneEntry::SIZE;
    let percentages_size: usize = entries.iter().map(BoneEntry::percentages_size).sum();
    let values_start = table_end + percentages_size;

    let header = AnimationHeader {
        percentages_start: to_u32("percentages section offset", table_end)?,
        values_start: to_u32("values section offset", values_start)?,
        duration: clip.duration,
        bone_count,
    };
    header.write(writer)?;

    for entry in &entries {
        entry.write(writer)?;
    }

    for bone in &clip.bones {
        write_percentages(writer, &bone.translations)?;
        write_percentages(writer, &bone.rotations)?;
        write_percentages(writer, &bone.scales)?;
    }

    for bone in &clip.bones {
        write_values(writer, &bone.translations)?;
        write_values(writer, &bone.rotations)?;
        write_values(writer, &bone.scales)?;
    }

    debug!(
        "Wrote animation: {} bones, values section at {}",
        bone_count, values_start
    );
    Ok(())
}

fn bone_entry(bone: &BoneAnimationData) -> Result<BoneEntry> {
    Ok(BoneEntry {
        bone_id: bone.bone_id,
        translation_count: key_count(&bone.translations)?,
        rotation_count: key_count(&bone.rotations)?,
        scale_count: key_count(&bone.scales)?,
    })
}

fn key_count<T: KeyValue>(timeline: &TimelineData<T>) -> Result<u16> {
    if timeline.percentages.len() != timeline.values.len() {
        return Err(AnimError::LengthMismatch {
            what: "timeline values",
            expected: timeline.percentages.len(),
            actual: timeline.values.len(),
        });
    }
    to_u16("keyframes", timeline.percentages.len())
}

fn write_percentages<W: Write, T>(writer: &mut W, timeline: &TimelineData<T>) -> Result<()> {
    for &percentage in &timeline.percentages {
        writer.write_f32::<LittleEndian>(percentage)?;
    }
    Ok(())
}

fn write_values<W: Write, T: KeyValue>(writer: &mut W, timeline: &TimelineData<T>) -> Result<()> {
    for value in &timeline.values {
        value.encode(writer)?;
    }
    Ok(())
}

pub(crate) fn to_u16(what: &'static str, count: usize) -> Result<u16> {
    u16::try_from(count).map_err(|_| AnimError::TooMany { what, count })
}

fn to_u32(what: &'static str, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| AnimError::TooMany { what, count })
}
