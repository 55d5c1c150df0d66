//! Root CLI structure for dais

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dais")]
#[command(about = "Command-line tools for skeletal animation files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Animation clip operations
    Anim {
        #[command(subcommand)]
        command: crate::commands::anim::AnimCommands,
    },

    /// Skinned mesh operations
    Mesh {
        #[command(subcommand)]
        command: crate::commands::mesh::MeshCommands,
    },

    /// List the bone names of a name assignment file
    Names {
        /// Path to the bone name file
        file: PathBuf,
    },

    /// Evaluate a clip on a mesh skeleton and print the skinning palette
    Pose(crate::commands::pose::PoseArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
