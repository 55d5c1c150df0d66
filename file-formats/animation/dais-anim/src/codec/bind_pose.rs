//! Bind-pose section of a skinned mesh
//!
//! ```text
//! u16 bone count
//! u16 parent ID per bone, plus one padding slot when the count is even
//! bone count x 40-byte transform (T xyz, R xyzw, S xyz)
//! ```
//!
//! The padding keeps the transform array 4-byte aligned.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;

use super::animation::to_u16;
use super::reader::ByteReader;
use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;
use crate::types::Transform;

/// Number of u16 parent slots stored for `bone_count` bones
pub fn parent_slot_count(bone_count: usize) -> usize {
    bone_count | 1
}

/// Size in bytes of a bind-pose section
pub fn bind_pose_size(bone_count: usize) -> usize {
    2 + parent_slot_count(bone_count) * 2 + bone_count * Transform::SIZE
}

/// Read a bind-pose section starting at `offset`
///
/// The result is not validated; pass it to
/// [`Skeleton::from_bind_pose`](crate::Skeleton::from_bind_pose).
pub fn read_bind_pose(data: &[u8], offset: usize) -> Result<BindPose> {
    let mut reader = ByteReader::at(data, offset, "pose")?;
    let bone_count = reader.read_u16()? as usize;

    let slots = reader.take(parent_slot_count(bone_count) * 2)?;
    let parents = slots
        .chunks_exact(2)
        .take(bone_count)
        .map(|slot| u16::from_le_bytes([slot[0], slot[1]]))
        .collect();

    let transforms = reader.take(bone_count * Transform::SIZE)?;
    let setup_pose = transforms
        .chunks_exact(Transform::SIZE)
        .map(Transform::decode)
        .collect();

    debug!("Read bind pose: {} bones at offset {}", bone_count, offset);
    Ok(BindPose {
        parents,
        setup_pose,
    })
}

/// Write a bind-pose section
pub fn write_bind_pose<W: Write>(pose: &BindPose, writer: &mut W) -> Result<()> {
    if pose.setup_pose.len() != pose.parents.len() {
        return Err(AnimError::LengthMismatch {
            what: "setup pose transforms",
            expected: pose.parents.len(),
            actual: pose.setup_pose.len(),
        });
    }
    let bone_count = to_u16("bones", pose.parents.len())?;
    writer.write_u16::<LittleEndian>(bone_count)?;

    for &parent in &pose.parents {
        writer.write_u16::<LittleEndian>(parent)?;
    }
    if pose.parents.len() % 2 == 0 {
        writer.write_u16::<LittleEndian>(0)?;
    }

    for transform in &pose.setup_pose {
        transform.encode(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn chain(bone_count: usize) -> BindPose {
        BindPose {
            parents: (0..bone_count).map(|i| i.saturating_sub(1) as u16).collect(),
            setup_pose: (0..bone_count)
                .map(|i| Transform::from_translation(Vec3::new(0.0, i as f32, 0.0)))
                .collect(),
        }
    }

    #[test]
    fn test_padding_slot() {
        assert_eq!(parent_slot_count(1), 1);
        assert_eq!(parent_slot_count(2), 3);
        assert_eq!(parent_slot_count(3), 3);
        assert_eq!(parent_slot_count(4), 5);
        // Count and parents always end on a 4-byte boundary.
        for bone_count in 1..10 {
            assert_eq!((2 + parent_slot_count(bone_count) * 2) % 4, 0);
        }
    }

    #[test]
    fn test_even_count_layout() {
        let pose = chain(2);
        let mut bytes = Vec::new();
        write_bind_pose(&pose, &mut bytes).unwrap();

        assert_eq!(bytes.len(), bind_pose_size(2));
        assert_eq!(&bytes[..8], &[2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &0.0f32.to_le_bytes());
        assert_eq!(read_bind_pose(&bytes, 0).unwrap(), pose);
    }

    #[test]
    fn test_odd_count_layout() {
        let pose = chain(3);
        let mut bytes = Vec::new();
        write_bind_pose(&pose, &mut bytes).unwrap();

        assert_eq!(bytes.len(), 2 + 3 * 2 + 3 * 40);
        assert_eq!(&bytes[..8], &[3, 0, 0, 0, 0, 0, 1, 0]);
        assert_eq!(read_bind_pose(&bytes, 0).unwrap(), pose);
    }

    #[test]
    fn test_read_at_offset() {
        let mut pose = chain(4);
        pose.setup_pose[3].rotation = Quat::from_xyzw(0.0, 1.0, 0.0, 0.0);
        let mut bytes = vec![0xAA; 12];
        write_bind_pose(&pose, &mut bytes).unwrap();
        assert_eq!(read_bind_pose(&bytes, 12).unwrap(), pose);
    }

    #[test]
    fn test_truncated_transforms() {
        let mut bytes = Vec::new();
        write_bind_pose(&chain(3), &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            read_bind_pose(&bytes, 0),
            Err(AnimError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_offset_past_end() {
        assert!(matches!(
            read_bind_pose(&[0; 4], 8),
            Err(AnimError::InvalidOffset { section: "pose", .. })
        ));
    }
}
