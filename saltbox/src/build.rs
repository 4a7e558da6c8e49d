//! Orchestration for building a sandbox.
//!
//! A build derives the effective configuration once and then runs every step
//! in a fixed order: data directory, minion config, pillars, grains, the file
//! root (state collection, or formulas then vendored formulas), dependency
//! formulas, and finally the top file. Later steps may overwrite files
//! earlier steps wrote at the same path.
//!
//! The first failure aborts the build. Whatever was already written stays in
//! the sandbox; cleaning it up is the caller's job.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SaltConfig;
use crate::core::effective::{EffectiveConfig, FileRootMode, MinionTargets};
use crate::core::filter::CopyFilter;
use crate::core::minion::render_minion_config;
use crate::core::paths::SandboxRoot;
use crate::error::Result;
use crate::events::{EventSink, SandboxEvent, Step};
use crate::io::copy::copy_directory;
use crate::io::formula::{copy_formula, copy_state_collection, vendored_formulas};
use crate::io::fs::write_raw_file;
use crate::io::grains::write_grains;
use crate::io::pillars::assemble_pillars;
use crate::io::state_top::write_state_top;

/// Sandbox directory that receives `data_path`.
pub const DATA_DIR: &str = "data";

/// Where a build writes and what relative local paths resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub sandbox: SandboxRoot,
    pub working_dir: PathBuf,
}

impl BuildContext {
    pub fn new(sandbox: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            sandbox: SandboxRoot::new(sandbox),
            working_dir: working_dir.into(),
        }
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Formula names in copy order: primary, vendored, then dependencies.
    /// Only dependencies appear in collection mode.
    pub formulas: Vec<String>,
    /// The file root was populated from a state collection.
    pub collection: bool,
    /// Pillar files written by the inline and file steps.
    pub pillar_files: usize,
}

/// Build the sandbox described by `config` into `ctx.sandbox`.
pub fn build_sandbox<S: EventSink + ?Sized>(
    config: &SaltConfig,
    ctx: &BuildContext,
    sink: &S,
) -> Result<BuildSummary> {
    let effective = EffectiveConfig::derive(config, &ctx.working_dir)?;
    debug!(
        sandbox = %ctx.sandbox.path().display(),
        working_dir = %ctx.working_dir.display(),
        "derived effective config"
    );
    build_effective(&effective, &ctx.sandbox, sink)
}

/// Run every build step for an already derived configuration.
pub fn build_effective<S: EventSink + ?Sized>(
    effective: &EffectiveConfig,
    sandbox: &SandboxRoot,
    sink: &S,
) -> Result<BuildSummary> {
    let mut summary = BuildSummary::default();

    prepare_data(sandbox, effective.data_path.as_deref(), &effective.filter, sink)?;
    write_minion_config(sandbox, &effective.minion, sink)?;

    let pillars = assemble_pillars(sandbox, &effective.pillars, &effective.filter, sink)?;
    summary.pillar_files = pillars.written.len();

    write_grains(sandbox, effective.grains.as_ref(), &effective.grains_path, sink)?;

    match &effective.file_root_mode {
        FileRootMode::Collection { source, name } => {
            copy_state_collection(
                sandbox,
                source,
                name,
                &effective.file_root,
                &effective.filter,
                sink,
            )?;
            summary.collection = true;
        }
        FileRootMode::Formulas {
            primary,
            vendor_path,
        } => {
            let mut formulas = vec![primary.clone()];
            if let Some(vendor_path) = vendor_path {
                formulas.extend(vendored_formulas(vendor_path)?);
            }
            for formula in &formulas {
                copy_formula(sandbox, formula, &effective.file_root, &effective.filter, sink)?;
                summary.formulas.push(formula.name.clone());
            }
        }
    }

    // Dependencies are copied in both file root modes.
    for dependency in &effective.dependencies {
        copy_formula(sandbox, dependency, &effective.file_root, &effective.filter, sink)?;
        summary.formulas.push(dependency.name.clone());
    }

    write_state_top(sandbox, &effective.state_top, &effective.state_top_path, sink)?;

    info!(
        sandbox = %sandbox.path().display(),
        formulas = summary.formulas.len(),
        collection = summary.collection,
        pillar_files = summary.pillar_files,
        "sandbox built"
    );
    Ok(summary)
}

fn prepare_data<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    data_path: Option<&Path>,
    filter: &CopyFilter,
    sink: &S,
) -> Result<()> {
    let Some(data_path) = data_path else {
        sink.emit(SandboxEvent::StepSkipped {
            step: Step::Data,
            reason: "no data_path configured",
        });
        return Ok(());
    };
    sink.emit(SandboxEvent::StepStarted {
        step: Step::Data,
        detail: data_path.display().to_string(),
    });
    copy_directory(data_path, &sandbox.resolve(DATA_DIR)?, filter, sink)?;
    Ok(())
}

fn write_minion_config<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    minion: &MinionTargets,
    sink: &S,
) -> Result<()> {
    sink.emit(SandboxEvent::StepStarted {
        step: Step::Minion,
        detail: minion.config_path.clone(),
    });
    let text = render_minion_config(&minion.environment, &minion.file_root, &minion.pillar_root);
    let path = sandbox.resolve(&minion.config_path)?;
    let bytes = write_raw_file(&path, text)?;
    sink.emit(SandboxEvent::FileWritten { path, bytes });
    Ok(())
}
