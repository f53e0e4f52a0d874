//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod patches;
pub mod play;
pub mod render;
