//! Bone hierarchy with its setup pose
//!
//! Bones are stored in a flat array where every parent precedes its
//! children, so hierarchy passes are a single forward loop. Bone 0 is the
//! root; its parent slot is ignored.

use log::debug;

use crate::arena::FrameContext;
use crate::clip::AnimationClip;
use crate::compose::{SetupMatrices, compose_pose};
use crate::error::{AnimError, Result};
use crate::math::Mat4x3;
use crate::pose::{BoundClip, evaluate_pose};
use crate::timeline::SamplerConfig;
use crate::types::Transform;

/// Bind pose as stored in a mesh file, not yet validated
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BindPose {
    pub parents: Vec<u16>,
    pub setup_pose: Vec<Transform>,
}

impl BindPose {
    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Check the hierarchy invariants
    pub fn validate(&self) -> Result<()> {
        if self.parents.is_empty() {
            return Err(AnimError::EmptySkeleton);
        }
        if self.setup_pose.len() != self.parents.len() {
            return Err(AnimError::LengthMismatch {
                what: "setup pose transforms",
                expected: self.parents.len(),
                actual: self.setup_pose.len(),
            });
        }
        for (bone, &parent) in self.parents.iter().enumerate().skip(1) {
            if parent as usize >= bone {
                return Err(AnimError::ParentOrder {
                    bone,
                    parent: parent as usize,
                });
            }
        }
        Ok(())
    }
}

/// Validated bone hierarchy with cached setup matrices
#[derive(Debug, Clone)]
pub struct Skeleton {
    parents: Vec<u16>,
    setup_pose: Vec<Transform>,
    setup: SetupMatrices,
}

impl Skeleton {
    /// Validate a hierarchy and bake its setup matrices
    pub fn new(parents: Vec<u16>, setup_pose: Vec<Transform>) -> Result<Self> {
        Self::from_bind_pose(BindPose {
            parents,
            setup_pose,
        })
    }

    /// Validate a loaded bind pose and bake its setup matrices
    pub fn from_bind_pose(pose: BindPose) -> Result<Self> {
        pose.validate()?;
        let setup = SetupMatrices::compute(&pose.parents, &pose.setup_pose);
        debug!("Built skeleton with {} bones", pose.parents.len());
        Ok(Self {
            parents: pose.parents,
            setup_pose: pose.setup_pose,
            setup,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Parent IDs; entry 0 is unused
    pub fn parents(&self) -> &[u16] {
        &self.parents
    }

    /// Parent of `bone`, `None` for the root or an unknown bone
    pub fn parent_of(&self, bone: usize) -> Option<usize> {
        if bone == 0 {
            return None;
        }
        self.parents.get(bone).map(|&parent| parent as usize)
    }

    pub fn setup_pose(&self) -> &[Transform] {
        &self.setup_pose
    }

    pub fn setup_matrices(&self) -> &SetupMatrices {
        &self.setup
    }

    /// Direct children of `bone`
    pub fn children_of(&self, bone: usize) -> impl Iterator<Item = usize> + '_ {
        self.parents
            .iter()
            .enumerate()
            .skip(1)
            .filter(move |&(_, &parent)| parent as usize == bone)
            .map(|(child, _)| child)
    }

    /// Number of ancestors of `bone`
    pub fn depth_of(&self, bone: usize) -> usize {
        let mut depth = 0;
        let mut current = bone;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Copy back into the storable bind pose
    pub fn to_bind_pose(&self) -> BindPose {
        BindPose {
            parents: self.parents.clone(),
            setup_pose: self.setup_pose.clone(),
        }
    }

    /// Check a clip's bone IDs against this skeleton
    pub fn bind_clip<'c, 'a>(&self, clip: &'c AnimationClip<'a>) -> Result<BoundClip<'c, 'a>> {
        BoundClip::new(clip, self.bone_count())
    }

    /// Sample `clip` at `percent` into local transforms, one per bone
    pub fn evaluate_pose(
        &self,
        clip: &BoundClip<'_, '_>,
        percent: f32,
        config: &SamplerConfig,
        out: &mut [Transform],
    ) {
        debug_assert_eq!(clip.bone_count(), self.bone_count());
        evaluate_pose(&self.setup_pose, clip, percent, config, out);
    }

    /// Compose local transforms into skinning matrices
    ///
    /// `local_matrices` and `local_offsets` are scratch space. Every slice
    /// holds one entry per bone.
    pub fn compose_into(
        &self,
        local_transforms: &[Transform],
        local_matrices: &mut [Mat4x3],
        local_offsets: &mut [Mat4x3],
        world: &mut [Mat4x3],
    ) {
        compose_pose(
            &self.setup,
            &self.parents,
            local_transforms,
            local_matrices,
            local_offsets,
            world,
        );
    }

    /// Evaluate and compose one frame using scratch from `frame`
    ///
    /// The returned skinning matrices live in the frame's matrix arena until
    /// the frame's marker is restored.
    pub fn pose_frame<'f>(
        &self,
        clip: &BoundClip<'_, '_>,
        percent: f32,
        config: &SamplerConfig,
        frame: &'f mut FrameContext,
    ) -> &'f [Mat4x3] {
        let count = self.bone_count();

        let transforms = frame.transforms.alloc(count);
        self.evaluate_pose(clip, percent, config, frame.transforms.get_mut(transforms));

        let block = frame.matrices.alloc(count * 3);
        let matrices = frame.matrices.get_mut(block);
        let (local_matrices, rest) = matrices.split_at_mut(count);
        let (local_offsets, world) = rest.split_at_mut(count);

        self.compose_into(
            frame.transforms.get(transforms),
            local_matrices,
            local_offsets,
            world,
        );
        world
    }

    /// Skinning matrices of the bind pose (all identity)
    pub fn bind_pose_frame<'f>(&self, frame: &'f mut FrameContext) -> &'f [Mat4x3] {
        let range = frame
            .matrices
            .alloc_filled(self.bone_count(), Mat4x3::IDENTITY);
        frame.matrices.get(range)
    }
}
