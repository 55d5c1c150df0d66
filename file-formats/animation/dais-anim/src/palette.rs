//! Skinning palette export and skeleton debug segments

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::math::Mat4x3;
use crate::skeleton::Skeleton;

/// Floats written per bone
pub const FLOATS_PER_BONE: usize = 12;

/// Element order of each exported 4x3 matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PaletteLayout {
    /// Four columns of three floats
    #[default]
    ColumnMajor,
    /// Three rows of four floats, as a `mat3x4` uniform expects
    RowMajor,
}

impl fmt::Display for PaletteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnMajor => f.write_str("column"),
            Self::RowMajor => f.write_str("row"),
        }
    }
}

impl FromStr for PaletteLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "column" | "column-major" | "col" => Ok(Self::ColumnMajor),
            "row" | "row-major" => Ok(Self::RowMajor),
            _ => Err(format!("unknown palette layout: {s}")),
        }
    }
}

/// Append the flattened matrices to `out`
pub fn write_palette_into(matrices: &[Mat4x3], layout: PaletteLayout, out: &mut Vec<f32>) {
    out.reserve(matrices.len() * FLOATS_PER_BONE);
    for matrix in matrices {
        let floats = match layout {
            PaletteLayout::ColumnMajor => matrix.to_cols_array(),
            PaletteLayout::RowMajor => matrix.to_rows_array(),
        };
        out.extend_from_slice(&floats);
    }
}

/// Flatten matrices into a GPU-ready float array
pub fn write_palette(matrices: &[Mat4x3], layout: PaletteLayout) -> Vec<f32> {
    let mut out = Vec::with_capacity(matrices.len() * FLOATS_PER_BONE);
    write_palette_into(matrices, layout, &mut out);
    out
}

/// Animated position of every joint
///
/// `skinning` holds the composed matrices of the current frame.
pub fn joint_positions(skeleton: &Skeleton, skinning: &[Mat4x3]) -> Vec<Vec3> {
    skinning
        .iter()
        .zip(&skeleton.setup_matrices().world)
        .map(|(matrix, setup)| matrix.transform_point(setup.translation()))
        .collect()
}

/// Parent-to-child line segments of the animated skeleton
///
/// One segment per non-root bone, from its parent's joint to its own.
pub fn bone_segments(skeleton: &Skeleton, skinning: &[Mat4x3]) -> Vec<(Vec3, Vec3)> {
    let joints = joint_positions(skeleton, skinning);
    (1..joints.len())
        .map(|child| {
            let parent = skeleton.parents()[child] as usize;
            (joints[parent], joints[child])
        })
        .collect()
}
