//! Matrix composition: local bone transforms to skinning matrices
//!
//! The setup pose is baked once per skeleton into [`SetupMatrices`]. Each
//! frame, [`compose_pose`] turns the animated local transforms into offsets
//! from the setup pose, moves those offsets into setup world space and
//! accumulates them down the hierarchy. The result for bone `i` is
//! `animated_world[i] * inverse(setup_world[i])`, ready for vertex skinning.
//! In the bind pose every result is the identity.

use log::trace;

use crate::math::Mat4x3;
use crate::types::Transform;

/// Build `Translate * Rotate * Scale` for every transform
pub fn transforms_to_matrices(transforms: &[Transform], out: &mut [Mat4x3]) {
    debug_assert_eq!(transforms.len(), out.len());
    for (matrix, transform) in out.iter_mut().zip(transforms) {
        *matrix = Mat4x3::from_transform(transform);
    }
}

/// Invert every matrix
pub fn invert_matrices(matrices: &[Mat4x3], out: &mut [Mat4x3]) {
    debug_assert_eq!(matrices.len(), out.len());
    for (inverse, matrix) in out.iter_mut().zip(matrices) {
        *inverse = matrix.inverse();
    }
}

/// `out[i] = a[i] * b[i]`
pub fn multiply_matrices(a: &[Mat4x3], b: &[Mat4x3], out: &mut [Mat4x3]) {
    debug_assert!(a.len() == out.len() && b.len() == out.len());
    for ((result, a), b) in out.iter_mut().zip(a).zip(b) {
        *result = a * b;
    }
}

/// `out[i] = a[i] * b[i] * c[i]`
pub fn multiply_matrices3(a: &[Mat4x3], b: &[Mat4x3], c: &[Mat4x3], out: &mut [Mat4x3]) {
    debug_assert!(a.len() == out.len() && b.len() == out.len() && c.len() == out.len());
    for (((result, a), b), c) in out.iter_mut().zip(a).zip(b).zip(c) {
        *result = a.mul_mat(b).mul_mat(c);
    }
}

/// Accumulate local matrices down the hierarchy
///
/// `world[0] = local[0]` and `world[i] = world[parents[i]] * local[i]`.
/// Parents must precede their children.
pub fn local_to_world(parents: &[u16], local: &[Mat4x3], world: &mut [Mat4x3]) {
    debug_assert!(parents.len() == local.len() && local.len() == world.len());
    let Some(root) = local.first() else {
        return;
    };
    world[0] = *root;
    for i in 1..local.len() {
        let parent = parents[i] as usize;
        debug_assert!(parent < i, "bone {i} has parent {parent}");
        world[i] = world[parent] * local[i];
    }
}

/// Per-skeleton matrices derived from the setup pose
#[derive(Debug, Clone, PartialEq)]
pub struct SetupMatrices {
    /// Setup pose of each bone relative to its parent
    pub local: Vec<Mat4x3>,
    pub inverse_local: Vec<Mat4x3>,
    /// Setup pose of each bone in skeleton space
    pub world: Vec<Mat4x3>,
    pub inverse_world: Vec<Mat4x3>,
}

impl SetupMatrices {
    /// Bake the setup pose of a validated hierarchy
    pub fn compute(parents: &[u16], setup_pose: &[Transform]) -> Self {
        let count = setup_pose.len();
        let mut local = vec![Mat4x3::IDENTITY; count];
        let mut inverse_local = vec![Mat4x3::IDENTITY; count];
        let mut world = vec![Mat4x3::IDENTITY; count];
        let mut inverse_world = vec![Mat4x3::IDENTITY; count];

        transforms_to_matrices(setup_pose, &mut local);
        invert_matrices(&local, &mut inverse_local);
        local_to_world(parents, &local, &mut world);
        invert_matrices(&world, &mut inverse_world);

        Self {
            local,
            inverse_local,
            world,
            inverse_world,
        }
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.local.len()
    }

    /// Whether there are no bones
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

/// Compose one frame
///
/// `local_matrices` and `local_offsets` are scratch; `world` receives the
/// skinning matrices. All slices hold one entry per bone.
pub fn compose_pose(
    setup: &SetupMatrices,
    parents: &[u16],
    local_transforms: &[Transform],
    local_matrices: &mut [Mat4x3],
    local_offsets: &mut [Mat4x3],
    world: &mut [Mat4x3],
) {
    transforms_to_matrices(local_transforms, local_matrices);
    multiply_matrices(&setup.inverse_local, local_matrices, local_offsets);
    multiply_matrices3(&setup.world, local_offsets, &setup.inverse_world, local_matrices);
    local_to_world(parents, local_matrices, world);
    trace!("Composed {} bone matrices", world.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    const EPS: f32 = 1e-5;

    fn arm() -> (Vec<u16>, Vec<Transform>) {
        let parents = vec![0, 0, 1];
        let setup = vec![
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Transform::new(
                Vec3::new(1.0, 0.0, 0.0),
                Quat::from_rotation_z(0.3),
                Vec3::ONE,
            ),
            Transform::new(
                Vec3::new(0.5, 0.0, 0.0),
                Quat::from_rotation_y(-0.2),
                Vec3::splat(1.2),
            ),
        ];
        (parents, setup)
    }

    fn compose(parents: &[u16], setup: &SetupMatrices, pose: &[Transform]) -> Vec<Mat4x3> {
        let n = pose.len();
        let mut local = vec![Mat4x3::IDENTITY; n];
        let mut offsets = vec![Mat4x3::IDENTITY; n];
        let mut world = vec![Mat4x3::IDENTITY; n];
        compose_pose(setup, parents, pose, &mut local, &mut offsets, &mut world);
        world
    }

    #[test]
    fn test_setup_world_root() {
        let (parents, pose) = arm();
        let setup = SetupMatrices::compute(&parents, &pose);
        assert_eq!(setup.world[0], setup.local[0]);
        assert!(
            setup.world[2].abs_diff_eq(&(setup.world[1] * setup.local[2]), EPS)
        );
        for i in 0..3 {
            assert!((setup.world[i] * setup.inverse_world[i]).abs_diff_eq(&Mat4x3::IDENTITY, EPS));
            assert!((setup.local[i] * setup.inverse_local[i]).abs_diff_eq(&Mat4x3::IDENTITY, EPS));
        }
    }

    #[test]
    fn test_bind_pose_gives_identity() {
        let (parents, pose) = arm();
        let setup = SetupMatrices::compute(&parents, &pose);
        let world = compose(&parents, &setup, &pose);
        for (i, matrix) in world.iter().enumerate() {
            assert!(matrix.abs_diff_eq(&Mat4x3::IDENTITY, EPS), "bone {i}: {matrix:?}");
            assert!((*matrix * setup.world[i]).abs_diff_eq(&setup.world[i], EPS));
        }
    }

    #[test]
    fn test_animated_world_matches_direct_hierarchy() {
        let (parents, setup_pose) = arm();
        let setup = SetupMatrices::compute(&parents, &setup_pose);

        let mut pose = setup_pose.clone();
        pose[1].rotation = Quat::from_rotation_z(1.1);
        pose[2].translation = Vec3::new(0.7, 0.1, 0.0);

        let world = compose(&parents, &setup, &pose);

        // Animated world transforms computed the plain way.
        let mut animated = vec![Mat4x3::IDENTITY; 3];
        let mut local = vec![Mat4x3::IDENTITY; 3];
        transforms_to_matrices(&pose, &mut local);
        local_to_world(&parents, &local, &mut animated);

        for i in 0..3 {
            let skinned = world[i] * setup.world[i];
            assert!(skinned.abs_diff_eq(&animated[i], 1e-4), "bone {i}");
        }
    }

    #[test]
    fn test_local_to_world_chain() {
        let parents = [0, 0, 1, 1];
        let step = Mat4x3::from_translation(Vec3::X);
        let local = [step; 4];
        let mut world = [Mat4x3::IDENTITY; 4];
        local_to_world(&parents, &local, &mut world);

        assert_eq!(world[0].translation(), Vec3::X);
        assert_eq!(world[1].translation(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(world[2].translation(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(world[3].translation(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_world_invariant_after_compose() {
        let (parents, setup_pose) = arm();
        let setup = SetupMatrices::compute(&parents, &setup_pose);
        let mut pose = setup_pose;
        pose[0].translation += Vec3::new(0.0, 0.0, 2.0);
        pose[2].scale = Vec3::new(1.0, 2.0, 1.0);

        let n = pose.len();
        let mut local = vec![Mat4x3::IDENTITY; n];
        let mut offsets = vec![Mat4x3::IDENTITY; n];
        let mut world = vec![Mat4x3::IDENTITY; n];
        compose_pose(&setup, &parents, &pose, &mut local, &mut offsets, &mut world);

        assert_eq!(world[0], local[0]);
        for i in 1..n {
            let expected = world[parents[i] as usize] * local[i];
            assert!(world[i].abs_diff_eq(&expected, EPS));
        }
    }

    #[test]
    fn test_empty_hierarchy() {
        let setup = SetupMatrices::compute(&[], &[]);
        assert!(setup.is_empty());
        let mut world: [Mat4x3; 0] = [];
        local_to_world(&[], &[], &mut world);
    }
}
