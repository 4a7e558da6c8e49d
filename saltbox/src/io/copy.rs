//! Recursive directory copy with a path-component filter.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use super::fs::{copy_file, create_dir};
use crate::core::filter::CopyFilter;
use crate::error::{IoResultExt, Result, SandboxError};
use crate::events::{EventSink, SandboxEvent};

/// Counts reported by `copy_filtered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub directories: usize,
    /// Entries excluded by the filter (a skipped directory counts once).
    pub skipped: usize,
}

/// Copy the tree under `source` into `dest`.
///
/// Entries whose path relative to `source` has a component matched by
/// `filter` are skipped together with their subtrees. Symlinks are followed
/// and their targets copied as regular files and directories. Entries are
/// visited in file-name order, so repeated copies write identical trees.
///
/// The first failure aborts the copy; entries already written stay in place.
pub fn copy_filtered(source: &Path, dest: &Path, filter: &CopyFilter) -> Result<CopyStats> {
    let meta = fs::metadata(source).with_path("read directory", source)?;
    if !meta.is_dir() {
        return Err(SandboxError::io(
            "read directory",
            source,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    create_dir(dest)?;

    let mut stats = CopyStats::default();
    let mut skipped = 0;
    let walker = WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let excluded = entry
                .path()
                .strip_prefix(source)
                .is_ok_and(|relative| filter.excludes(relative));
            if excluded {
                skipped += 1;
            }
            !excluded
        });

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(source).to_path_buf();
            SandboxError::io("walk directory", path, io::Error::from(err))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| {
                SandboxError::io(
                    "walk directory",
                    entry.path(),
                    io::Error::other("entry outside copy source"),
                )
            })?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            create_dir(&target)?;
            stats.directories += 1;
        } else {
            copy_file(entry.path(), &target)?;
            stats.files += 1;
        }
    }

    stats.skipped = skipped;
    Ok(stats)
}

/// `copy_filtered`, reporting the copy to `sink`.
pub fn copy_directory<S: EventSink + ?Sized>(
    source: &Path,
    dest: &Path,
    filter: &CopyFilter,
    sink: &S,
) -> Result<CopyStats> {
    let stats = copy_filtered(source, dest, filter)?;
    sink.emit(SandboxEvent::DirectoryCopied {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        files: stats.files,
        skipped: stats.skipped,
    });
    Ok(stats)
}
