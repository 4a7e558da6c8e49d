//! Deterministic, pure logic shared by the build steps.
//!
//! Core modules never touch the filesystem. They operate on in-memory
//! configuration and data and return deterministic outputs suitable for
//! tests.

pub mod effective;
pub mod filter;
pub mod minion;
pub mod normalize;
pub mod paths;
pub mod yaml;
