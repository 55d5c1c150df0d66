//! Formatting utilities

use dais_anim::Transform;
use glam::{Quat, Vec3};
use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a vector as `(x, y, z)`
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Format a quaternion as `(x, y, z, w)`
pub fn format_quat(q: Quat) -> String {
    format!("({:.4}, {:.4}, {:.4}, {:.4})", q.x, q.y, q.z, q.w)
}

/// Format a transform as `[(t) (r) (s)]`
pub fn format_transform(transform: &Transform) -> String {
    format!(
        "[{} {} {}]",
        format_vec3(transform.translation),
        format_quat(transform.rotation),
        format_vec3(transform.scale)
    )
}

/// Format a clip percentage
pub fn format_percentage(value: f32) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
    }

    #[test]
    fn test_format_transform() {
        assert_eq!(
            format_transform(&Transform::IDENTITY),
            "[(0.0000, 0.0000, 0.0000) (0.0000, 0.0000, 0.0000, 1.0000) (1.0000, 1.0000, 1.0000)]"
        );
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.25), "25.0%");
        assert_eq!(format_percentage(1.0), "100.0%");
    }
}
