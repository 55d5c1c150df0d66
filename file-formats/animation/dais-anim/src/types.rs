//! Core value types shared by the codec, sampler and composition engine

use std::fmt;
use std::io::Write;

use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use glam::{Quat, Vec3};

/// Decomposed bone transform: translation, rotation and scale
///
/// Always relative to the bone's parent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Size of one serialized transform record (10 x f32)
    pub const SIZE: usize = 40;

    /// Transform that leaves everything in place
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Transform with only a translation
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Transform with only a rotation
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Decode a transform record (T xyz, R xyzw, S xyz)
    pub(crate) fn decode(bytes: &[u8]) -> Self {
        Self {
            translation: Vec3::decode(&bytes[0..12]),
            rotation: Quat::decode(&bytes[12..28]),
            scale: Vec3::decode(&bytes[28..40]),
        }
    }

    /// Encode a transform record
    pub(crate) fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.translation.encode(writer)?;
        self.rotation.encode(writer)?;
        self.scale.encode(writer)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

bitflags! {
    /// Which channels of a bone are animated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChannelFlags: u16 {
        const TRANSLATION = 1 << 0;
        const ROTATION = 1 << 1;
        const SCALE = 1 << 2;
    }
}

impl ChannelFlags {
    /// Rebuild the flags from per-channel keyframe counts
    pub fn from_counts(translations: usize, rotations: usize, scales: usize) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::TRANSLATION, translations > 0);
        flags.set(Self::ROTATION, rotations > 0);
        flags.set(Self::SCALE, scales > 0);
        flags
    }
}

/// One animatable property of a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Translation,
    Rotation,
    Scale,
}

impl Channel {
    /// All channels in serialization order
    pub const ALL: [Self; 3] = [Self::Translation, Self::Rotation, Self::Scale];

    /// The flag bit for this channel
    pub fn flag(self) -> ChannelFlags {
        match self {
            Self::Translation => ChannelFlags::TRANSLATION,
            Self::Rotation => ChannelFlags::ROTATION,
            Self::Scale => ChannelFlags::SCALE,
        }
    }

    /// Lowercase channel name
    pub fn name(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A keyframe value with a fixed little-endian encoding
pub trait KeyValue: Copy + fmt::Debug {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes
    fn decode(bytes: &[u8]) -> Self;

    /// Encode to a writer
    fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
}

impl KeyValue for Vec3 {
    const SIZE: usize = 12;

    fn decode(bytes: &[u8]) -> Self {
        Self::new(
            LittleEndian::read_f32(&bytes[0..4]),
            LittleEndian::read_f32(&bytes[4..8]),
            LittleEndian::read_f32(&bytes[8..12]),
        )
    }

    fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)
    }
}

impl KeyValue for Quat {
    const SIZE: usize = 16;

    // Stored x, y, z, w; not normalized on load.
    fn decode(bytes: &[u8]) -> Self {
        Self::from_xyzw(
            LittleEndian::read_f32(&bytes[0..4]),
            LittleEndian::read_f32(&bytes[4..8]),
            LittleEndian::read_f32(&bytes[8..12]),
            LittleEndian::read_f32(&bytes[12..16]),
        )
    }

    fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)?;
        writer.write_f32::<LittleEndian>(self.w)
    }
}
