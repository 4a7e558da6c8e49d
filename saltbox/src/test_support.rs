//! Test-only helpers for building project fixtures and inspecting sandboxes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::events::{EventSink, SandboxEvent, Step};

/// A throwaway project directory, removed on drop.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Records every emitted event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<SandboxEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SandboxEvent> {
        self.events.borrow().clone()
    }

    /// Steps in the order they reported `StepStarted`, deduplicated when a
    /// step starts several times in a row (one per formula).
    pub fn started_steps(&self) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::new();
        for event in &*self.events.borrow() {
            if let SandboxEvent::StepStarted { step, .. } = event {
                if steps.last() != Some(step) {
                    steps.push(*step);
                }
            }
        }
        steps
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SandboxEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Relative path -> contents for every file under `root`.
///
/// Directories only show up through the files they contain.
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.expect("walk sandbox"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("entry under root")
                .to_path_buf();
            let contents = fs::read(entry.path()).expect("read sandbox file");
            (rel, contents)
        })
        .collect()
}
