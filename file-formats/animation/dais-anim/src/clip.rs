//! Animation clips: a zero-copy runtime view and an owned, editable form

use std::io::Write;

use glam::{Quat, Vec3};

use crate::codec::animation::{read_clip, write_clip};
use crate::error::Result;
use crate::timeline::{SamplerConfig, Timeline, TimelineData, Track};
use crate::types::{ChannelFlags, Transform};

/// Keyframe channels of one bone, borrowed from a loaded clip buffer
#[derive(Debug, Clone, Copy)]
pub struct BoneAnimation<'a> {
    pub bone_id: u16,
    pub flags: ChannelFlags,
    pub translations: Timeline<'a, Vec3>,
    pub rotations: Timeline<'a, Quat>,
    pub scales: Timeline<'a, Vec3>,
}

impl BoneAnimation<'_> {
    /// Total keyframes across all channels
    pub fn key_count(&self) -> usize {
        self.translations.len() + self.rotations.len() + self.scales.len()
    }

    /// Overwrite the animated channels of `transform` with sampled values
    ///
    /// Channels without keys keep their current value.
    pub fn apply(&self, transform: &mut Transform, percent: f32, config: &SamplerConfig) {
        if self.flags.contains(ChannelFlags::TRANSLATION)
            && let Some(translation) = self.translations.sample(percent, config)
        {
            transform.translation = translation;
        }
        if self.flags.contains(ChannelFlags::ROTATION)
            && let Some(rotation) = self.rotations.sample(percent, config)
        {
            transform.rotation = rotation;
        }
        if self.flags.contains(ChannelFlags::SCALE)
            && let Some(scale) = self.scales.sample(percent, config)
        {
            transform.scale = scale;
        }
    }

    /// Decode into an owned bone animation
    pub fn to_owned_data(&self) -> BoneAnimationData {
        BoneAnimationData {
            bone_id: self.bone_id,
            translations: self.translations.to_owned_data(),
            rotations: self.rotations.to_owned_data(),
            scales: self.scales.to_owned_data(),
        }
    }
}

/// Animation clip parsed in place from a byte buffer
///
/// Only the bone table is decoded up front; keyframes are read from the
/// buffer while sampling.
#[derive(Debug, Clone)]
pub struct AnimationClip<'a> {
    pub(crate) duration: f32,
    pub(crate) bones: Vec<BoneAnimation<'a>>,
}

impl<'a> AnimationClip<'a> {
    /// Parse a clip from its binary form
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        read_clip(data)
    }

    /// Clip length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Animated bones in file order
    pub fn bones(&self) -> &[BoneAnimation<'a>] {
        &self.bones
    }

    /// Number of animated bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Animation of a given bone, if it is animated
    pub fn find_bone(&self, bone_id: u16) -> Option<&BoneAnimation<'a>> {
        self.bones.iter().find(|bone| bone.bone_id == bone_id)
    }

    /// Highest animated bone ID
    pub fn max_bone_id(&self) -> Option<u16> {
        self.bones.iter().map(|bone| bone.bone_id).max()
    }

    /// Total keyframes across all bones and channels
    pub fn key_count(&self) -> usize {
        self.bones.iter().map(BoneAnimation::key_count).sum()
    }

    /// Decode into an owned clip
    pub fn to_owned_data(&self) -> AnimationClipData {
        AnimationClipData {
            duration: self.duration,
            bones: self.bones.iter().map(BoneAnimation::to_owned_data).collect(),
        }
    }
}

/// Owned keyframe channels of one bone
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BoneAnimationData {
    pub bone_id: u16,
    pub translations: TimelineData<Vec3>,
    pub rotations: TimelineData<Quat>,
    pub scales: TimelineData<Vec3>,
}

impl BoneAnimationData {
    /// Create a bone animation with no channels
    pub fn new(bone_id: u16) -> Self {
        Self {
            bone_id,
            ..Self::default()
        }
    }

    /// Channels that carry keys
    pub fn flags(&self) -> ChannelFlags {
        ChannelFlags::from_counts(
            self.translations.len(),
            self.rotations.len(),
            self.scales.len(),
        )
    }

    /// Whether no channel carries keys
    pub fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }
}

/// Owned animation clip
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnimationClipData {
    pub duration: f32,
    pub bones: Vec<BoneAnimationData>,
}

impl AnimationClipData {
    /// Create an empty clip
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            bones: Vec::new(),
        }
    }

    /// Write the clip in its binary form
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_clip(self, writer)
    }

    /// Serialize the clip to a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}
