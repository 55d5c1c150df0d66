//! Pose evaluation command

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use dais_anim::codec::read_mesh_bind_pose;
use dais_anim::palette::{FLOATS_PER_BONE, bone_segments, write_palette};
use dais_anim::playback::percent_at;
use dais_anim::{
    AnimationClip, FrameContext, PaletteLayout, SamplerConfig, Skeleton, WrapMode,
};

use crate::utils::{format_percentage, format_vec3, read_file};

#[derive(Args)]
pub struct PoseArgs {
    /// Path to the skinned mesh providing the skeleton
    mesh: PathBuf,

    /// Path to the animation clip
    anim: PathBuf,

    /// Clip position from 0.0 to 1.0
    #[arg(short, long, conflicts_with = "time")]
    percent: Option<f32>,

    /// Playback time in seconds, wrapped into the clip
    #[arg(short, long)]
    time: Option<f32>,

    /// How playback time outside the clip wraps (clamp, repeat, ping-pong)
    #[arg(long, env = "DAIS_WRAP", default_value = "repeat")]
    wrap: WrapMode,

    /// Renormalize blended rotations
    #[arg(long)]
    normalize_rotations: bool,

    /// Matrix element order (column, row)
    #[arg(long, env = "DAIS_LAYOUT", default_value = "column")]
    layout: PaletteLayout,

    /// Also print the animated bone segments
    #[arg(long)]
    segments: bool,
}

pub fn execute(args: PoseArgs) -> Result<()> {
    let mesh_data = read_file(&args.mesh)?;
    let (_header, pose) = read_mesh_bind_pose(&mesh_data)
        .with_context(|| format!("Failed to parse mesh: {}", args.mesh.display()))?;
    let skeleton = Skeleton::from_bind_pose(pose)
        .with_context(|| format!("Invalid bind pose in {}", args.mesh.display()))?;

    let anim_data = read_file(&args.anim)?;
    let clip = AnimationClip::parse(&anim_data)
        .with_context(|| format!("Failed to parse animation clip: {}", args.anim.display()))?;
    let bound = skeleton
        .bind_clip(&clip)
        .context("Animation does not fit the mesh skeleton")?;

    let percent = match args.time {
        Some(time) => percent_at(time, clip.duration(), args.wrap),
        None => args.percent.unwrap_or(0.0),
    };
    let config = if args.normalize_rotations {
        SamplerConfig::normalized()
    } else {
        SamplerConfig::default()
    };
    info!(
        "Evaluating {} bones at {} ({:?})",
        skeleton.bone_count(),
        percent,
        config.rotation_blend
    );

    let mut frame = FrameContext::with_bone_capacity(skeleton.bone_count());
    let marker = frame.begin_frame();
    let world = skeleton.pose_frame(&bound, percent, &config, &mut frame);
    let palette = write_palette(world, args.layout);
    let segments = args.segments.then(|| bone_segments(&skeleton, world));
    frame.end_frame(marker);

    println!("Skeleton: {} bones", skeleton.bone_count());
    println!(
        "Clip: {:.3}s, {} animated bones",
        clip.duration(),
        clip.bone_count()
    );
    println!("Position: {}", format_percentage(percent));

    println!("\n=== Skinning Palette ({}-major) ===", args.layout);
    for (bone, floats) in palette.chunks_exact(FLOATS_PER_BONE).enumerate() {
        let row: Vec<String> = floats.iter().map(|f| format!("{f:.4}")).collect();
        println!("  {bone}: {}", row.join(" "));
    }

    if let Some(segments) = segments {
        println!("\n=== Bone Segments ===");
        for (index, (from, to)) in segments.iter().enumerate() {
            let child = index + 1;
            println!(
                "  {} -> {child}: {} -> {}",
                skeleton.parents()[child],
                format_vec3(*from),
                format_vec3(*to)
            );
        }
    }

    Ok(())
}
