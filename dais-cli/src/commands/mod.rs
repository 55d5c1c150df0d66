//! Command implementations for each file type

pub mod anim;
pub mod mesh;
pub mod names;
pub mod pose;
