//! Skinned mesh command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use dais_anim::Skeleton;
use dais_anim::codec::read_mesh_bind_pose;

use crate::commands::anim::{bone_label, load_names};
use crate::utils::{add_table_row, create_table, format_bytes, format_transform, read_file};

#[derive(Subcommand)]
pub enum MeshCommands {
    /// Display the header and bind pose of a skinned mesh
    Info {
        /// Path to the mesh file
        file: PathBuf,

        /// Bone name file used to label bones
        #[arg(long, value_name = "FILE")]
        names: Option<PathBuf>,
    },
}

pub fn execute(command: MeshCommands) -> Result<()> {
    match command {
        MeshCommands::Info { file, names } => handle_info(&file, names.as_deref()),
    }
}

fn handle_info(path: &Path, names: Option<&Path>) -> Result<()> {
    println!("Loading mesh: {}", path.display());

    let data = read_file(path)?;
    let (header, pose) = read_mesh_bind_pose(&data)
        .with_context(|| format!("Failed to parse mesh: {}", path.display()))?;
    let names = names.map(load_names).transpose()?;

    println!("\n=== Mesh Information ===");
    println!("File size: {}", format_bytes(data.len() as u64));

    let mut table = create_table(&["Section", "Value"]);
    add_table_row(&mut table, ["Draw calls".to_string(), header.draw_count.to_string()]);
    add_table_row(&mut table, ["Meshes".to_string(), header.mesh_count.to_string()]);
    add_table_row(&mut table, ["Materials".to_string(), header.material_count.to_string()]);
    add_table_row(&mut table, ["Textures".to_string(), header.texture_count.to_string()]);
    add_table_row(&mut table, ["Vertex offset".to_string(), header.vertex_start.to_string()]);
    add_table_row(&mut table, ["Index offset".to_string(), header.index_start.to_string()]);
    add_table_row(&mut table, ["Pose offset".to_string(), header.pose_start.to_string()]);
    table.printstd();

    let skeleton = Skeleton::from_bind_pose(pose)
        .with_context(|| format!("Invalid bind pose in {}", path.display()))?;
    let max_depth = (0..skeleton.bone_count())
        .map(|bone| skeleton.depth_of(bone))
        .max()
        .unwrap_or(0);

    println!("\n=== Bind Pose ===");
    println!("Bones: {}", skeleton.bone_count());
    println!("Hierarchy depth: {max_depth}");
    for (bone, transform) in skeleton.setup_pose().iter().enumerate() {
        let parent = skeleton.parents()[bone];
        match names.as_ref() {
            Some(names) => println!(
                "  {bone} ({parent}) {}: {}",
                bone_label(Some(names), bone as u16),
                format_transform(transform)
            ),
            None => println!("  {bone} ({parent}): {}", format_transform(transform)),
        }
    }

    Ok(())
}
