//! Structured build events.
//!
//! Build steps never log directly. They report `SandboxEvent`s to an
//! injected `EventSink`; the binary forwards them to `tracing`, tests record
//! them.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

/// Build step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Data,
    Minion,
    Pillars,
    Grains,
    StateCollection,
    Formula,
    StateTop,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Data => "data",
            Step::Minion => "minion",
            Step::Pillars => "pillars",
            Step::Grains => "grains",
            Step::StateCollection => "state_collection",
            Step::Formula => "formula",
            Step::StateTop => "state_top",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxEvent {
    /// A step began. `detail` names its subject (a formula, a target root).
    StepStarted { step: Step, detail: String },
    /// A step had nothing configured and did nothing.
    StepSkipped { step: Step, reason: &'static str },
    DirectoryCopied {
        source: PathBuf,
        dest: PathBuf,
        files: usize,
        skipped: usize,
    },
    FileWritten { path: PathBuf, bytes: usize },
    FileCopied { source: PathBuf, dest: PathBuf },
    /// An optional formula extension directory does not exist.
    ExtensionMissing { path: PathBuf },
    /// No inline or file pillars; the local salt root's pillars were used.
    PillarFallback { source: PathBuf },
}

pub trait EventSink {
    fn emit(&self, event: SandboxEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SandboxEvent) {
        match event {
            SandboxEvent::StepStarted { step, detail } => {
                info!(%step, %detail, "preparing");
            }
            SandboxEvent::StepSkipped { step, reason } => {
                debug!(%step, reason, "skipped");
            }
            SandboxEvent::DirectoryCopied {
                source,
                dest,
                files,
                skipped,
            } => {
                debug!(
                    source = %source.display(),
                    dest = %dest.display(),
                    files,
                    skipped,
                    "copied directory"
                );
            }
            SandboxEvent::FileWritten { path, bytes } => {
                debug!(path = %path.display(), bytes, "wrote file");
            }
            SandboxEvent::FileCopied { source, dest } => {
                debug!(source = %source.display(), dest = %dest.display(), "copied file");
            }
            SandboxEvent::ExtensionMissing { path } => {
                debug!(path = %path.display(), "extension directory missing, skipping");
            }
            SandboxEvent::PillarFallback { source } => {
                info!(source = %source.display(), "using pillars from local salt root");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SandboxEvent) {}
}
