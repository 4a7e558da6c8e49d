//! Error taxonomy for sandbox assembly.
//!
//! Nothing in the crate recovers from these locally: the first error aborts
//! the remaining build steps and is handed back to the caller.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T, E = SandboxError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SandboxError {
    /// An input is structurally invalid for the selected mode.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A filesystem read, write or copy failed.
    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A structured value could not be rendered as YAML.
    #[error("serialize {what}")]
    Serialization {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SandboxError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Attach the failing action and path to an `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn with_path(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| SandboxError::io(action, path, source))
    }
}
