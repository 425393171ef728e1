//! Filesystem and clock helpers shared across the workspace.

pub mod fs;
pub mod time;
