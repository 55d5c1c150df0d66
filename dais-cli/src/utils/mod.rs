//! Shared utilities for the dais CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Read a whole file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))
}
