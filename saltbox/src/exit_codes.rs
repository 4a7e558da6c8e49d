//! Stable exit codes for saltbox CLI commands.

use crate::error::SandboxError;

/// Command succeeded.
pub const OK: i32 = 0;
/// A filesystem or serialization step failed.
pub const FAILED: i32 = 1;
/// The manifest or provisioner configuration is invalid.
pub const INVALID_CONFIG: i32 = 2;

/// Exit code for a failed command.
pub fn for_error(err: &SandboxError) -> i32 {
    if err.is_configuration() {
        INVALID_CONFIG
    } else {
        FAILED
    }
}
