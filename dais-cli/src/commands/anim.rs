//! Animation clip command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use dais_anim::{AnimationClip, BoneAnimation, BoneNames};

use crate::utils::{
    add_table_row, create_table, format_bytes, format_quat, format_vec3, read_file,
};

#[derive(Subcommand)]
pub enum AnimCommands {
    /// Display information about an animation clip
    Info {
        /// Path to the animation file
        file: PathBuf,

        /// Dump every keyframe
        #[arg(short, long)]
        detailed: bool,

        /// Bone name file used to label bones
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,
    },
}

pub fn execute(command: AnimCommands) -> Result<()> {
    match command {
        AnimCommands::Info {
            file,
            detailed,
            names,
        } => handle_info(&file, detailed, names.as_deref()),
    }
}

fn handle_info(path: &Path, detailed: bool, names: Option<&Path>) -> Result<()> {
    println!("Loading animation clip: {}", path.display());

    let data = read_file(path)?;
    let clip = AnimationClip::parse(&data)
        .with_context(|| format!("Failed to parse animation clip: {}", path.display()))?;
    let names = names.map(load_names).transpose()?;

    println!("\n=== Animation Clip Information ===");
    println!("File size: {}", format_bytes(data.len() as u64));
    println!("Duration: {:.3}s", clip.duration());
    println!("Animated bones: {}", clip.bone_count());
    println!("Keyframes: {}", clip.key_count());

    if clip.bone_count() > 0 {
        let mut table = create_table(&["Bone", "Name", "Translations", "Rotations", "Scales"]);
        for bone in clip.bones() {
            add_table_row(
                &mut table,
                [
                    bone.bone_id.to_string(),
                    bone_label(names.as_ref(), bone.bone_id),
                    bone.translations.len().to_string(),
                    bone.rotations.len().to_string(),
                    bone.scales.len().to_string(),
                ],
            );
        }
        println!();
        table.printstd();
    }

    if detailed {
        println!("\n=== Keyframes ===");
        for bone in clip.bones() {
            print_keyframes(bone, names.as_ref());
        }
    }

    Ok(())
}

fn print_keyframes(bone: &BoneAnimation<'_>, names: Option<&BoneNames>) {
    println!(
        "\nBone {} ({}):",
        bone.bone_id,
        bone_label(names, bone.bone_id)
    );
    if !bone.translations.is_empty() {
        println!("  Translations:");
        for (percent, value) in bone.translations.keys() {
            println!("    {percent:>8.4} -> {}", format_vec3(value));
        }
    }
    if !bone.rotations.is_empty() {
        println!("  Rotations:");
        for (percent, value) in bone.rotations.keys() {
            println!("    {percent:>8.4} -> {}", format_quat(value));
        }
    }
    if !bone.scales.is_empty() {
        println!("  Scales:");
        for (percent, value) in bone.scales.keys() {
            println!("    {percent:>8.4} -> {}", format_vec3(value));
        }
    }
}

pub(crate) fn load_names(path: &Path) -> Result<BoneNames> {
    let data = read_file(path)?;
    BoneNames::parse(&data)
        .with_context(|| format!("Failed to parse bone names: {}", path.display()))
}

pub(crate) fn bone_label(names: Option<&BoneNames>, bone_id: u16) -> String {
    names
        .and_then(|names| names.name(bone_id))
        .unwrap_or("-")
        .to_string()
}
