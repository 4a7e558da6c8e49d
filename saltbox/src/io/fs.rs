//! Raw file helpers shared by the build steps.

use std::fs;
use std::path::Path;

use crate::error::{IoResultExt, Result};

pub fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_path("create directory", path)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_raw_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<usize> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    let contents = contents.as_ref();
    fs::write(path, contents).with_path("write file", path)?;
    Ok(contents.len())
}

/// Copy `source` byte-for-byte to `dest`, creating parent directories.
///
/// Symlinks are followed. An existing file at `dest` is replaced, even when
/// it is read-only.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        create_dir(parent)?;
    }
    remove_stale_file(dest)?;
    fs::copy(source, dest).with_path("copy file", source)
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_path("read file", path)
}

fn remove_stale_file(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => fs::remove_file(path).with_path("replace file", path),
        _ => Ok(()),
    }
}
