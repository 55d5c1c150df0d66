//! 4x3 affine matrices used for bone composition and the skinning palette

use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};

use crate::types::Transform;

/// 4x3 affine matrix (four columns of three rows, column-major)
///
/// Behaves like a 4x4 matrix with an implicit `[0, 0, 0, 1]` bottom row.
/// The first three columns hold rotation and scale, `w_axis` holds the
/// translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4x3 {
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub w_axis: Vec3,
}

impl Mat4x3 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        x_axis: Vec3::X,
        y_axis: Vec3::Y,
        z_axis: Vec3::Z,
        w_axis: Vec3::ZERO,
    };

    /// Create a matrix from its four columns
    pub const fn from_cols(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, w_axis: Vec3) -> Self {
        Self {
            x_axis,
            y_axis,
            z_axis,
            w_axis,
        }
    }

    /// Create translation matrix
    pub fn from_translation(v: Vec3) -> Self {
        Self {
            w_axis: v,
            ..Self::IDENTITY
        }
    }

    /// Create scale matrix
    pub fn from_scale(v: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(v.x, 0.0, 0.0),
            Vec3::new(0.0, v.y, 0.0),
            Vec3::new(0.0, 0.0, v.z),
            Vec3::ZERO,
        )
    }

    /// Create rotation matrix from quaternion
    ///
    /// The quaternion is used as-is; blended rotations that drifted from unit
    /// length produce a matrix with a matching (small) scale error.
    pub fn from_quat(q: Quat) -> Self {
        let x2 = q.x + q.x;
        let y2 = q.y + q.y;
        let z2 = q.z + q.z;

        let xx = q.x * x2;
        let xy = q.x * y2;
        let xz = q.x * z2;
        let yy = q.y * y2;
        let yz = q.y * z2;
        let zz = q.z * z2;
        let wx = q.w * x2;
        let wy = q.w * y2;
        let wz = q.w * z2;

        Self::from_cols(
            Vec3::new(1.0 - (yy + zz), xy + wz, xz - wy),
            Vec3::new(xy - wz, 1.0 - (xx + zz), yz + wx),
            Vec3::new(xz + wy, yz - wx, 1.0 - (xx + yy)),
            Vec3::ZERO,
        )
    }

    /// Translate * Rotate * Scale
    ///
    /// Scale applies first, then rotation, then translation.
    pub fn from_transform(transform: &Transform) -> Self {
        let rotation = Self::from_quat(transform.rotation);
        let scale = transform.scale;
        Self::from_cols(
            rotation.x_axis * scale.x,
            rotation.y_axis * scale.y,
            rotation.z_axis * scale.z,
            transform.translation,
        )
    }

    /// Extend to a 4x4 matrix with a `[0, 0, 0, 1]` bottom row
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols(
            self.x_axis.extend(0.0),
            self.y_axis.extend(0.0),
            self.z_axis.extend(0.0),
            self.w_axis.extend(1.0),
        )
    }

    /// Drop the bottom row of a 4x4 matrix
    pub fn from_mat4_truncate(m: &Mat4) -> Self {
        Self::from_cols(
            m.x_axis.truncate(),
            m.y_axis.truncate(),
            m.z_axis.truncate(),
            m.w_axis.truncate(),
        )
    }

    /// General 4x4 inverse, truncated back to 4x3
    ///
    /// Negating the translation alone is not an inverse: the translation
    /// must also go through the inverse rotation and scale.
    pub fn inverse(&self) -> Self {
        Self::from_mat4_truncate(&self.to_mat4().inverse())
    }

    /// Multiply two matrices (self * other)
    ///
    /// Same result as extending `self` to 4x4, multiplying and truncating.
    pub fn mul_mat(&self, other: &Self) -> Self {
        Self::from_cols(
            self.transform_vector(other.x_axis),
            self.transform_vector(other.y_axis),
            self.transform_vector(other.z_axis),
            self.transform_point(other.w_axis),
        )
    }

    /// Transform a point (applies translation)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.x_axis * p.x + self.y_axis * p.y + self.z_axis * p.z + self.w_axis
    }

    /// Transform a direction (ignores translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.x_axis * v.x + self.y_axis * v.y + self.z_axis * v.z
    }

    /// Translation column
    pub fn translation(&self) -> Vec3 {
        self.w_axis
    }

    /// Columns flattened, 12 floats
    pub fn to_cols_array(&self) -> [f32; 12] {
        [
            self.x_axis.x,
            self.x_axis.y,
            self.x_axis.z,
            self.y_axis.x,
            self.y_axis.y,
            self.y_axis.z,
            self.z_axis.x,
            self.z_axis.y,
            self.z_axis.z,
            self.w_axis.x,
            self.w_axis.y,
            self.w_axis.z,
        ]
    }

    /// Rows flattened (3 rows of 4), 12 floats
    pub fn to_rows_array(&self) -> [f32; 12] {
        [
            self.x_axis.x,
            self.y_axis.x,
            self.z_axis.x,
            self.w_axis.x,
            self.x_axis.y,
            self.y_axis.y,
            self.z_axis.y,
            self.w_axis.y,
            self.x_axis.z,
            self.y_axis.z,
            self.z_axis.z,
            self.w_axis.z,
        ]
    }

    /// Component-wise comparison with an absolute tolerance
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.x_axis.abs_diff_eq(other.x_axis, max_abs_diff)
            && self.y_axis.abs_diff_eq(other.y_axis, max_abs_diff)
            && self.z_axis.abs_diff_eq(other.z_axis, max_abs_diff)
            && self.w_axis.abs_diff_eq(other.w_axis, max_abs_diff)
    }
}

impl Default for Mat4x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4x3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_mat(&rhs)
    }
}

impl Mul for &Mat4x3 {
    type Output = Mat4x3;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul_mat(rhs)
    }
}
