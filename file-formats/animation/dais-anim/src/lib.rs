//! Skeletal animation baking and pose composition.
//!
//! Loads skinned-mesh bind poses and animation clips from their binary
//! forms, samples clips at a playback percentage and composes the sampled
//! local transforms into per-bone 4x3 skinning matrices.
//!
//! ```rust,no_run
//! use dais_anim::{AnimationClip, FrameContext, SamplerConfig, Skeleton};
//! use dais_anim::codec::read_mesh_bind_pose;
//!
//! # fn main() -> dais_anim::Result<()> {
//! let mesh = std::fs::read("hero.mesh")?;
//! let anim = std::fs::read("hero_run.anim")?;
//!
//! let (_header, pose) = read_mesh_bind_pose(&mesh)?;
//! let skeleton = Skeleton::from_bind_pose(pose)?;
//! let clip = AnimationClip::parse(&anim)?;
//! let bound = skeleton.bind_clip(&clip)?;
//!
//! let mut frame = FrameContext::new();
//! let marker = frame.begin_frame();
//! let palette = skeleton.pose_frame(&bound, 0.5, &SamplerConfig::default(), &mut frame);
//! assert_eq!(palette.len(), skeleton.bone_count());
//! frame.end_frame(marker);
//! # Ok(())
//! # }
//! ```

pub mod arena;
pub mod bake;
pub mod clip;
pub mod codec;
pub mod compose;
pub mod error;
pub mod math;
pub mod palette;
pub mod playback;
pub mod pose;
pub mod skeleton;
pub mod timeline;
pub mod types;

// Re-export common types
pub use arena::{FrameArena, FrameContext};
pub use bake::{ClipBuilder, TimeSpan};
pub use clip::{AnimationClip, AnimationClipData, BoneAnimation, BoneAnimationData};
pub use codec::{BoneNames, MeshHeader};
pub use compose::SetupMatrices;
pub use error::{AnimError, Result};
pub use math::Mat4x3;
pub use palette::PaletteLayout;
pub use playback::{Playback, WrapMode};
pub use pose::BoundClip;
pub use skeleton::{BindPose, Skeleton};
pub use timeline::{RotationBlend, SamplerConfig, Timeline, TimelineData, Track};
pub use types::{Channel, ChannelFlags, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
