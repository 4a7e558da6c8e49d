//! Effective configuration: the manifest with defaults derived and local
//! paths resolved.
//!
//! Derivation never touches the filesystem and never mutates the input;
//! later build steps only ever see the returned value.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::filter::CopyFilter;
use super::minion::STATE_TOP_FILE;
use super::paths::join_target;
use crate::config::{PillarSource, SaltConfig};
use crate::error::{Result, SandboxError};

/// A named directory of states, located at `base_path/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Formula {
    pub base_path: PathBuf,
    pub name: String,
}

/// How the sandbox file root gets populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRootMode {
    /// Copy `source` wholesale into `<file root>/<name>`.
    Collection { source: PathBuf, name: String },
    /// Copy the primary formula, then every formula under `vendor_path`.
    Formulas {
        primary: Formula,
        vendor_path: Option<PathBuf>,
    },
}

/// Where the top file comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateTopSource {
    Inline(Value),
    FromFile(PathBuf),
}

/// Minion config inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinionTargets {
    pub environment: String,
    /// File root as seen on the target host.
    pub file_root: String,
    /// Pillar root as seen on the target host.
    pub pillar_root: String,
    /// Sandbox-relative location of the config file.
    pub config_path: String,
}

/// Everything the pillar assembler consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarSources {
    pub directories: Vec<PillarSource>,
    pub inline: Option<Value>,
    pub from_files: Option<Mapping>,
    pub pillar_root: String,
    pub local_salt_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub filter: CopyFilter,
    pub data_path: Option<PathBuf>,
    pub minion: MinionTargets,
    pub pillars: PillarSources,
    pub grains: Option<Value>,
    /// Sandbox-relative grains file.
    pub grains_path: String,
    pub file_root: String,
    pub file_root_mode: FileRootMode,
    pub dependencies: Vec<Formula>,
    pub state_top: StateTopSource,
    pub state_top_path: String,
}

impl EffectiveConfig {
    /// Derive the effective configuration for a build started from
    /// `working_dir`. Relative local paths are resolved against it.
    pub fn derive(config: &SaltConfig, working_dir: &Path) -> Result<Self> {
        require_mapping("pillars", config.pillars.as_ref())?;
        require_mapping("grains", config.grains.as_ref())?;
        let local = |path: &Path| working_dir.join(path);
        let project_root = config
            .kitchen_root
            .as_deref()
            .map_or_else(|| working_dir.to_path_buf(), local);

        let file_root_mode = if config.is_collection_mode() {
            FileRootMode::Collection {
                source: project_root,
                name: collection_name(config),
            }
        } else {
            let name = config
                .formula
                .clone()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    SandboxError::configuration(
                        "formula must be set unless state_collection or is_file_root is enabled",
                    )
                })?;
            FileRootMode::Formulas {
                primary: Formula {
                    base_path: project_root,
                    name,
                },
                vendor_path: config.vendor_path.as_deref().map(local),
            }
        };

        let directories = config
            .pillars_from_directories
            .iter()
            .map(|source| match source {
                PillarSource::PlainDirectory(path) => PillarSource::PlainDirectory(local(path)),
                PillarSource::MappedDirectory { source, dest } => PillarSource::MappedDirectory {
                    source: local(source),
                    dest: dest.clone(),
                },
            })
            .collect();

        let state_top = if config.state_top_from_file {
            StateTopSource::FromFile(working_dir.join(STATE_TOP_FILE))
        } else if config.state_top.is_null() {
            StateTopSource::Inline(Value::Mapping(Mapping::new()))
        } else {
            StateTopSource::Inline(config.state_top.clone())
        };

        Ok(Self {
            filter: config.salt_copy_filter.clone(),
            data_path: config.data_path.as_deref().map(local),
            minion: MinionTargets {
                environment: config.salt_env.clone(),
                file_root: join_target(&config.root_path, &config.salt_file_root),
                pillar_root: join_target(&config.root_path, &config.salt_pillar_root),
                config_path: config.salt_minion_config.clone(),
            },
            pillars: PillarSources {
                directories,
                inline: config.pillars.clone(),
                from_files: config.pillars_from_files.as_ref().map(|files| {
                    resolve_file_sources(files, working_dir)
                }),
                pillar_root: config.salt_pillar_root.clone(),
                local_salt_root: config.local_salt_root.as_deref().map(local),
            },
            grains: config.grains.clone(),
            grains_path: join_target(&config.salt_config, "grains"),
            file_root: config.salt_file_root.clone(),
            file_root_mode,
            dependencies: config
                .dependencies
                .iter()
                .map(|dep| Formula {
                    base_path: local(&dep.path),
                    name: dep.name.clone(),
                })
                .collect(),
            state_top,
            state_top_path: config.salt_state_top.clone(),
        })
    }
}

/// Collection directory name under the file root.
///
/// Neither name set means the project is a pre-built collection copied
/// straight into the file root. An empty or missing name falls back to the
/// formula.
fn collection_name(config: &SaltConfig) -> String {
    let name = config.collection_name.as_deref().filter(|name| !name.is_empty());
    match (name, &config.formula) {
        (Some(name), _) => name.to_string(),
        (None, Some(formula)) => formula.clone(),
        (None, None) => String::new(),
    }
}

fn require_mapping(field: &str, value: Option<&Value>) -> Result<()> {
    match value {
        None | Some(Value::Mapping(_)) => Ok(()),
        Some(_) => Err(SandboxError::configuration(format!("{field} must be a mapping"))),
    }
}

/// Resolve string source paths against `working_dir`, keeping keys and any
/// non-string values as they are.
fn resolve_file_sources(files: &Mapping, working_dir: &Path) -> Mapping {
    files
        .iter()
        .map(|(key, value)| {
            let value = match value.as_str() {
                Some(path) => Value::String(working_dir.join(path).to_string_lossy().into_owned()),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}
