//! Filesystem side of the build steps.

pub mod config;
pub mod copy;
pub mod formula;
pub mod fs;
pub mod grains;
pub mod pillars;
pub mod state_top;
