//! Binary codecs for clips, bind poses, mesh headers and bone names
//!
//! All formats are little-endian with no magic. Codecs operate on byte
//! buffers and writers; reading files is left to the caller.

pub mod animation;
pub mod bind_pose;
pub mod bone_names;
pub mod mesh;
mod reader;

pub use animation::{AnimationHeader, BoneEntry, read_clip, write_clip};
pub use bind_pose::{bind_pose_size, read_bind_pose, write_bind_pose};
pub use bone_names::{BoneNames, NAME_LENGTH};
pub use mesh::{MeshHeader, read_mesh_bind_pose};
pub use reader::ByteReader;
