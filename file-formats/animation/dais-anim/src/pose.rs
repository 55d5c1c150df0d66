//! Pose evaluation: setup pose overlaid with sampled clip channels

use crate::clip::{AnimationClip, BoneAnimation};
use crate::error::{AnimError, Result};
use crate::timeline::SamplerConfig;
use crate::types::Transform;

/// A clip whose bone IDs were checked against a skeleton
///
/// Created by [`Skeleton::bind_clip`](crate::Skeleton::bind_clip).
#[derive(Debug, Clone, Copy)]
pub struct BoundClip<'c, 'a> {
    clip: &'c AnimationClip<'a>,
    bone_count: usize,
}

impl<'c, 'a> BoundClip<'c, 'a> {
    /// Check every bone ID of `clip` against `bone_count`
    pub fn new(clip: &'c AnimationClip<'a>, bone_count: usize) -> Result<Self> {
        if let Some(bone) = clip
            .bones()
            .iter()
            .find(|bone| bone.bone_id as usize >= bone_count)
        {
            return Err(AnimError::BoneOutOfRange {
                bone: bone.bone_id as usize,
                bone_count,
            });
        }
        Ok(Self { clip, bone_count })
    }

    /// The underlying clip
    pub fn clip(&self) -> &'c AnimationClip<'a> {
        self.clip
    }

    /// Bone count of the skeleton the clip was bound to
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Animated bones
    pub fn bones(&self) -> &'c [BoneAnimation<'a>] {
        self.clip.bones()
    }
}

/// Evaluate `clip` at `percent` into `out`
///
/// Every bone starts from its setup transform; animated channels are then
/// overwritten with sampled values.
pub fn evaluate_pose(
    setup_pose: &[Transform],
    clip: &BoundClip<'_, '_>,
    percent: f32,
    config: &SamplerConfig,
    out: &mut [Transform],
) {
    debug_assert_eq!(setup_pose.len(), clip.bone_count());
    out.copy_from_slice(setup_pose);
    for bone in clip.bones() {
        if let Some(transform) = out.get_mut(bone.bone_id as usize) {
            bone.apply(transform, percent, config);
        }
    }
}
