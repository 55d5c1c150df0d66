//! Integration tests for loading, sampling and composing animations

use std::f32::consts::FRAC_PI_2;

use dais_anim::bake::{BoneTrackBuilder, merge_all, sample_timeline};
use dais_anim::codec::{MeshHeader, read_mesh_bind_pose, write_bind_pose};
use dais_anim::palette::{bone_segments, write_palette};
use dais_anim::timeline::binary_search_lower;
use dais_anim::*;
use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;

const EPS: f32 = 1e-5;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Mesh file with a header, some opaque geometry and the bind pose
fn create_test_mesh(pose: &BindPose) -> Vec<u8> {
    let geometry = [0x5Au8; 24];
    let header = MeshHeader {
        draw_count: 1,
        mesh_count: 1,
        material_count: 1,
        texture_count: 0,
        vertex_start: MeshHeader::SIZE as u32,
        index_start: MeshHeader::SIZE as u32 + 16,
        pose_start: (MeshHeader::SIZE + geometry.len()) as u32,
    };
    let mut bytes = Vec::new();
    header.write(&mut bytes).unwrap();
    bytes.extend_from_slice(&geometry);
    write_bind_pose(pose, &mut bytes).unwrap();
    bytes
}

/// Hips, spine, neck and a leg, offset from each other with some rotation
fn create_test_pose() -> BindPose {
    BindPose {
        parents: vec![0, 0, 1, 0],
        setup_pose: vec![
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Transform::new(
                Vec3::new(0.0, 0.3, 0.0),
                Quat::from_rotation_x(0.1),
                Vec3::ONE,
            ),
            Transform::new(
                Vec3::new(0.0, 0.4, 0.05),
                Quat::from_rotation_z(-0.2),
                Vec3::splat(0.9),
            ),
            Transform::new(
                Vec3::new(0.15, -0.05, 0.0),
                Quat::from_rotation_z(3.0),
                Vec3::ONE,
            ),
        ],
    }
}

fn create_test_clip() -> AnimationClipData {
    let mut builder = ClipBuilder::new(TimeSpan::new(0.0, 2.0).unwrap());
    builder
        .add_bone(
            BoneTrackBuilder::new(0)
                .translation(0.0, Vec3::new(0.0, 1.0, 0.0))
                .translation(1.0, Vec3::new(0.0, 1.1, 0.2))
                .translation(2.0, Vec3::new(0.0, 1.0, 0.4)),
        )
        .add_bone(
            BoneTrackBuilder::new(1)
                .rotation(0.0, Quat::from_rotation_x(0.1))
                .rotation(2.0, Quat::from_rotation_x(0.4)),
        )
        .add_bone(
            BoneTrackBuilder::new(3)
                .rotation(0.0, Quat::from_rotation_z(3.0))
                .rotation(0.5, Quat::from_rotation_z(2.6))
                .rotation(2.0, Quat::from_rotation_z(3.0))
                .scale(1.0, Vec3::splat(1.1)),
        );
    builder.build().unwrap()
}

#[test]
fn test_clip_round_trip() {
    init_logging();
    let data = create_test_clip();
    let bytes = data.to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();

    assert_eq!(clip.duration(), data.duration);
    assert_eq!(clip.bone_count(), data.bones.len());
    for (view, owned) in clip.bones().iter().zip(&data.bones) {
        assert_eq!(view.bone_id, owned.bone_id);
        assert_eq!(view.translations.len(), owned.translations.len());
        assert_eq!(view.rotations.len(), owned.rotations.len());
        assert_eq!(view.scales.len(), owned.scales.len());
        // Bit-identical, not just approximately equal.
        for (a, b) in view.rotations.values().zip(&owned.rotations.values) {
            assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
        }
        for (a, b) in view.translations.percentages().zip(&owned.translations.percentages) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
    assert_eq!(clip.to_owned_data(), data);
}

#[test]
fn test_mesh_bind_pose_loads_into_skeleton() {
    init_logging();
    let pose = create_test_pose();
    let bytes = create_test_mesh(&pose);

    let (header, loaded) = read_mesh_bind_pose(&bytes).unwrap();
    assert_eq!(header.pose_start, 44);
    assert_eq!(loaded, pose);

    let skeleton = Skeleton::from_bind_pose(loaded).unwrap();
    assert_eq!(skeleton.bone_count(), 4);
    let setup = skeleton.setup_matrices();
    assert_eq!(setup.world[0], setup.local[0]);
}

#[test]
fn test_bind_pose_is_identity_palette() {
    let skeleton = Skeleton::from_bind_pose(create_test_pose()).unwrap();

    // A clip whose keys reproduce the setup pose exactly.
    let mut data = AnimationClipData::new(1.0);
    for (bone, transform) in skeleton.setup_pose().iter().enumerate() {
        let mut animation = BoneAnimationData::new(bone as u16);
        animation.translations = TimelineData::constant(transform.translation);
        animation.rotations = TimelineData::constant(transform.rotation);
        animation.scales = TimelineData::constant(transform.scale);
        data.bones.push(animation);
    }
    let bytes = data.to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();
    let bound = skeleton.bind_clip(&clip).unwrap();

    let mut frame = FrameContext::new();
    for percent in [0.0, 0.37, 1.0] {
        let marker = frame.begin_frame();
        let world = skeleton.pose_frame(&bound, percent, &SamplerConfig::default(), &mut frame);
        for (i, matrix) in world.iter().enumerate() {
            let setup = skeleton.setup_matrices().world[i];
            assert!((*matrix * setup).abs_diff_eq(&setup, EPS), "bone {i}");
            assert!(matrix.abs_diff_eq(&Mat4x3::IDENTITY, EPS), "bone {i}");
        }
        frame.end_frame(marker);
    }
}

#[test]
fn test_world_matrices_follow_hierarchy() {
    let skeleton = Skeleton::from_bind_pose(create_test_pose()).unwrap();
    let bytes = create_test_clip().to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();
    let bound = skeleton.bind_clip(&clip).unwrap();

    let n = skeleton.bone_count();
    let mut local_transforms = vec![Transform::IDENTITY; n];
    let mut local = vec![Mat4x3::IDENTITY; n];
    let mut offsets = vec![Mat4x3::IDENTITY; n];
    let mut world = vec![Mat4x3::IDENTITY; n];

    skeleton.evaluate_pose(&bound, 0.6, &SamplerConfig::default(), &mut local_transforms);
    skeleton.compose_into(&local_transforms, &mut local, &mut offsets, &mut world);

    assert_eq!(world[0], local[0]);
    for i in 1..n {
        let parent = skeleton.parent_of(i).unwrap();
        assert!(world[i].abs_diff_eq(&(world[parent] * local[i]), EPS));
    }

    // Skinning matrix times setup world equals the animated world transform.
    let mut animated_local = vec![Mat4x3::IDENTITY; n];
    let mut animated_world = vec![Mat4x3::IDENTITY; n];
    dais_anim::compose::transforms_to_matrices(&local_transforms, &mut animated_local);
    dais_anim::compose::local_to_world(skeleton.parents(), &animated_local, &mut animated_world);
    for i in 0..n {
        let skinned = world[i] * skeleton.setup_matrices().world[i];
        assert!(skinned.abs_diff_eq(&animated_world[i], 1e-4), "bone {i}");
    }
}

#[test]
fn test_scenario_single_rotation_key() {
    // Three identity bones in a chain; bone 1 holds a 90 degree turn about Y.
    let skeleton = Skeleton::new(vec![0, 0, 1], vec![Transform::IDENTITY; 3]).unwrap();

    let mut data = AnimationClipData::new(1.0);
    let mut bone = BoneAnimationData::new(1);
    bone.rotations = TimelineData::new(vec![0.0], vec![Quat::from_rotation_y(FRAC_PI_2)]).unwrap();
    data.bones.push(bone);
    let bytes = data.to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();
    let bound = skeleton.bind_clip(&clip).unwrap();

    let expected = Mat4x3::from_quat(Quat::from_rotation_y(FRAC_PI_2));
    let mut frame = FrameContext::with_bone_capacity(3);
    for percent in [0.0, 0.5, 1.0, 3.0] {
        let marker = frame.begin_frame();
        let world = skeleton.pose_frame(&bound, percent, &SamplerConfig::default(), &mut frame);
        assert!(world[0].abs_diff_eq(&Mat4x3::IDENTITY, EPS));
        assert!(world[1].abs_diff_eq(&expected, EPS));
        assert!(world[2].abs_diff_eq(&expected, EPS));
        frame.end_frame(marker);
    }
}

#[test]
fn test_scenario_translation_midpoint() {
    let timeline = TimelineData::new(
        vec![0.0, 0.5, 1.0],
        vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO],
    )
    .unwrap();
    let value = timeline.sample(0.25, &SamplerConfig::default()).unwrap();
    assert!(value.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS));
}

#[test]
fn test_scenario_near_opposite_quaternions_take_short_arc() {
    // 179 degrees apart in quaternion space, about 2 degrees apart as rotations.
    let from = Quat::IDENTITY;
    let to = -Quat::from_rotation_y(2.0_f32.to_radians());
    assert!(from.dot(to) < 0.0);

    let naive = (from + to) * 0.5;
    assert!(naive.length() < 0.02);

    let timeline = TimelineData::new(vec![0.0, 1.0], vec![from, to]).unwrap();
    let mid = timeline.sample(0.5, &SamplerConfig::default()).unwrap();

    assert!(mid.length() > 0.99);
    assert!(mid.dot(from) > 0.0);
    let expected = Quat::from_rotation_y(1.0_f32.to_radians());
    assert!(mid.normalize().abs_diff_eq(expected, 1e-4));
}

#[test]
fn test_sampling_boundaries_are_exact() {
    let values = [
        Vec3::new(0.3, -1.7, 2.9),
        Vec3::new(5.0, 5.0, 5.0),
        Vec3::new(-0.1, 0.2, 1e-3),
    ];
    let timeline = TimelineData::new(vec![0.1, 0.4, 0.8], values.to_vec()).unwrap();
    let config = SamplerConfig::default();
    for percent in [-3.0, 0.0, 0.1] {
        assert_eq!(timeline.sample(percent, &config), Some(values[0]));
    }
    for percent in [0.8, 0.95, 12.0] {
        assert_eq!(timeline.sample(percent, &config), Some(values[2]));
    }

    let single = TimelineData::constant(Quat::from_rotation_x(1.0));
    for percent in [-1.0, 0.0, 0.5, 2.0] {
        assert_eq!(
            single.sample(percent, &config),
            Some(Quat::from_rotation_x(1.0))
        );
    }
}

#[test]
fn test_binary_search_brackets() {
    let percentages = [0.0, 0.05, 0.3, 0.31, 0.6, 0.99];
    assert_eq!(binary_search_lower(&percentages, -1.0), 0);
    assert_eq!(binary_search_lower(&percentages, 0.99), 4);
    assert_eq!(binary_search_lower(&percentages, 0.305), 2);
    assert_eq!(binary_search_lower(&percentages, 0.31), 3);
}

#[test]
fn test_out_of_range_clip_is_rejected() {
    let skeleton = Skeleton::new(vec![0, 0], vec![Transform::IDENTITY; 2]).unwrap();
    let mut data = AnimationClipData::new(1.0);
    let mut bone = BoneAnimationData::new(2);
    bone.scales = TimelineData::constant(Vec3::ONE);
    data.bones.push(bone);
    let bytes = data.to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();

    assert!(matches!(
        skeleton.bind_clip(&clip),
        Err(AnimError::BoneOutOfRange {
            bone: 2,
            bone_count: 2
        })
    ));
}

#[test]
fn test_playback_drives_sampling() {
    let skeleton = Skeleton::from_bind_pose(create_test_pose()).unwrap();
    let bytes = create_test_clip().to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();
    let bound = skeleton.bind_clip(&clip).unwrap();

    let mut playback = Playback::new(WrapMode::Repeat);
    let mut frame = FrameContext::new();
    let config = SamplerConfig::normalized();

    let mut palettes = Vec::new();
    for _ in 0..5 {
        let marker = frame.begin_frame();
        let percent = playback.percent(clip.duration());
        let world = skeleton.pose_frame(&bound, percent, &config, &mut frame);
        palettes.push(write_palette(world, PaletteLayout::RowMajor));
        frame.end_frame(marker);
        playback.advance(0.5);
    }

    // Time 2.0 wraps back to the start of the clip.
    assert_eq!(palettes[0], palettes[4]);
    assert_ne!(palettes[0], palettes[1]);
    assert_eq!(palettes[0].len(), 4 * 12);
    assert_eq!(frame.matrices.used(), 0);
    assert_eq!(frame.matrices.high_water(), 12);
}

#[test]
fn test_bone_segments_track_animation() {
    let skeleton = Skeleton::from_bind_pose(create_test_pose()).unwrap();
    let bytes = create_test_clip().to_bytes().unwrap();
    let clip = AnimationClip::parse(&bytes).unwrap();
    let bound = skeleton.bind_clip(&clip).unwrap();

    let mut frame = FrameContext::new();
    let world = skeleton
        .pose_frame(&bound, 1.0, &SamplerConfig::default(), &mut frame)
        .to_vec();
    let segments = bone_segments(&skeleton, &world);
    assert_eq!(segments.len(), 3);

    // The hips end at the last translation key.
    let hips = segments[0].0;
    assert!(hips.abs_diff_eq(Vec3::new(0.0, 1.0, 0.4), 1e-4));
    // Spine and leg both start at the hips.
    assert!(segments[2].0.abs_diff_eq(hips, 1e-4));
}

#[test]
fn test_baked_axes_sample_times() {
    let x = [0.0, 0.5, 1.0];
    let y = [0.25, 1.0];
    let times = merge_all([&x[..], &y[..]]);
    let span = TimeSpan::new(0.0, 1.0).unwrap();
    let timeline = sample_timeline(&times, &span, |t| Vec3::new(t as f32, 2.0 * t as f32, 0.0));

    assert_eq!(timeline.percentages, vec![0.0, 0.25, 0.5, 1.0]);
    let mid = timeline.sample(0.75, &SamplerConfig::default()).unwrap();
    assert!(mid.abs_diff_eq(Vec3::new(0.75, 1.5, 0.0), EPS));
}
