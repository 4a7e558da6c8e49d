//! Sandbox-relative path resolution.
//!
//! Target paths in the configuration look absolute (`/srv/pillar`,
//! `/etc/salt/minion`) because they describe the layout on the target host.
//! Locally they are always reinterpreted under the sandbox root.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SandboxError};

/// Root directory of one sandbox build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Join `target` under the sandbox root, ignoring any leading `/`.
    ///
    /// Fails when `target` contains `..`, since the result could land outside
    /// the sandbox.
    pub fn resolve(&self, target: impl AsRef<Path>) -> Result<PathBuf> {
        let target = target.as_ref();
        let mut resolved = self.root.clone();
        for component in target.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(SandboxError::configuration(format!(
                        "sandbox target {} must not contain '..'",
                        target.display()
                    )));
                }
            }
        }
        Ok(resolved)
    }

    /// Resolve `relative` under the already sandbox-relative `base` target.
    pub fn resolve_under(&self, base: &str, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = relative.as_ref();
        let relative = relative.strip_prefix("/").unwrap_or(relative);
        self.resolve(Path::new(base).join(relative))
    }
}

/// Join two target-host paths the way a shell would, collapsing the slash
/// between them (`/tmp/kitchen` + `/srv/salt` = `/tmp/kitchen/srv/salt`).
pub fn join_target(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return if base.is_empty() { "/".to_string() } else { base.to_string() };
    }
    format!("{base}/{path}")
}
