//! Bone name file command

use anyhow::Result;
use std::path::PathBuf;

use crate::commands::anim::load_names;
use crate::utils::{add_table_row, create_table};

pub fn execute(file: PathBuf) -> Result<()> {
    println!("Loading bone names: {}", file.display());

    let names = load_names(&file)?;
    println!("Bones: {}", names.len());

    if names.is_empty() {
        return Ok(());
    }

    let mut table = create_table(&["Bone", "Name"]);
    for (bone, name) in names.iter().enumerate() {
        add_table_row(&mut table, [bone.to_string(), name.to_string()]);
    }
    println!();
    table.printstd();

    Ok(())
}
