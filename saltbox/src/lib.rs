//! Salt sandbox builder.
//!
//! Assembles the on-disk tree a masterless salt minion consumes during a test
//! run: minion config, pillars, grains, formulas or a state collection, and
//! the top file. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (key normalization, YAML
//!   rendering, configuration derivation, sandbox path resolution).
//! - **[`io`]**: Filesystem operations (filtered copies, pillar assembly,
//!   manifest loading).
//!
//! [`build`] coordinates the two in a fixed step order and reports progress
//! through the [`events::EventSink`] seam.

pub mod build;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{Result, SandboxError};
