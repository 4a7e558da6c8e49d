//! Formula and state collection copies into the sandbox file root.

use std::fs;
use std::path::{Path, PathBuf};

use super::copy::copy_directory;
use crate::core::effective::Formula;
use crate::core::filter::CopyFilter;
use crate::core::paths::SandboxRoot;
use crate::error::{IoResultExt, Result, SandboxError};
use crate::events::{EventSink, SandboxEvent, Step};

/// Custom module directories salt loads from the file root. Every formula
/// copied may add to them.
pub const EXTENSION_DIRS: [&str; 5] = [
    "_modules",
    "_states",
    "_grains",
    "_renderers",
    "_returners",
];

/// Copy `formula` and any extension directories next to it into `file_root`.
pub fn copy_formula<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    formula: &Formula,
    file_root: &str,
    filter: &CopyFilter,
    sink: &S,
) -> Result<()> {
    sink.emit(SandboxEvent::StepStarted {
        step: Step::Formula,
        detail: format!("{} from {}", formula.name, formula.base_path.display()),
    });

    let source = formula.base_path.join(&formula.name);
    let dest = sandbox.resolve_under(file_root, &formula.name)?;
    copy_directory(&source, &dest, filter, sink)?;

    for extension in EXTENSION_DIRS {
        let source = formula.base_path.join(extension);
        if !source.is_dir() {
            sink.emit(SandboxEvent::ExtensionMissing { path: source });
            continue;
        }
        let dest = sandbox.resolve_under(file_root, extension)?;
        copy_directory(&source, &dest, filter, sink)?;
    }
    Ok(())
}

/// Copy the whole project at `source` into `<file_root>/<name>`.
///
/// An empty `name` copies straight into the file root.
pub fn copy_state_collection<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    source: &Path,
    name: &str,
    file_root: &str,
    filter: &CopyFilter,
    sink: &S,
) -> Result<PathBuf> {
    sink.emit(SandboxEvent::StepStarted {
        step: Step::StateCollection,
        detail: if name.is_empty() {
            "pre-built collection".to_string()
        } else {
            name.to_string()
        },
    });
    let dest = sandbox.resolve_under(file_root, name)?;
    copy_directory(source, &dest, filter, sink)?;
    Ok(dest)
}

/// Formulas vendored under `vendor_path`: one per immediate subdirectory,
/// in name order.
///
/// A configured vendor path that does not exist is a configuration error.
pub fn vendored_formulas(vendor_path: &Path) -> Result<Vec<Formula>> {
    if !vendor_path.exists() {
        return Err(SandboxError::configuration(format!(
            "invalid vendor_path: {} does not exist",
            vendor_path.display()
        )));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(vendor_path).with_path("read directory", vendor_path)? {
        let entry = entry.with_path("read directory", vendor_path)?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| Formula {
            base_path: vendor_path.to_path_buf(),
            name,
        })
        .collect())
}
