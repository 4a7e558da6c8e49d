//! Provisioner configuration as written in a test manifest.
//!
//! Field names follow the manifest spelling. Every field is optional and
//! falls back to the defaults of a stock masterless salt layout.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::core::filter::CopyFilter;

pub const DEFAULT_ROOT_PATH: &str = "/tmp/kitchen";
pub const DEFAULT_PILLAR_ROOT: &str = "/srv/pillar";
pub const DEFAULT_FILE_ROOT: &str = "/srv/salt";
pub const DEFAULT_SALT_CONFIG: &str = "/etc/salt";
pub const DEFAULT_MINION_CONFIG: &str = "/etc/salt/minion";
pub const DEFAULT_STATE_TOP: &str = "/srv/salt/top.sls";
pub const DEFAULT_SALT_ENV: &str = "base";

/// Immutable provisioner inputs for one sandbox build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaltConfig {
    /// Inline pillar data, one top-level key per pillar file.
    pub pillars: Option<Value>,

    /// Pillar file name -> local source file, copied verbatim.
    #[serde(rename = "pillars-from-files")]
    pub pillars_from_files: Option<Mapping>,

    #[serde(
        rename = "pillars-from-directories",
        alias = "pillars_from_directories"
    )]
    pub pillars_from_directories: Vec<PillarSource>,

    pub grains: Option<Value>,

    /// Inline top file. Ignored when `state_top_from_file` is set.
    pub state_top: Value,

    /// Read `top.sls` from the working directory instead of `state_top`.
    pub state_top_from_file: bool,

    pub salt_pillar_root: String,
    pub salt_file_root: String,
    pub salt_config: String,
    pub salt_minion_config: String,
    pub salt_state_top: String,
    pub salt_env: String,

    /// Copy the whole project as a state collection instead of one formula.
    pub state_collection: bool,
    /// Treat the project as the file root itself (same copy mode as
    /// `state_collection`).
    pub is_file_root: bool,
    pub collection_name: Option<String>,
    pub formula: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub vendor_path: Option<PathBuf>,
    pub salt_copy_filter: CopyFilter,
    pub local_salt_root: Option<PathBuf>,
    pub data_path: Option<PathBuf>,

    /// Sandbox location on the target host.
    pub root_path: String,
    /// Project directory holding the formula; defaults to the working
    /// directory.
    pub kitchen_root: Option<PathBuf>,
}

impl Default for SaltConfig {
    fn default() -> Self {
        Self {
            pillars: None,
            pillars_from_files: None,
            pillars_from_directories: Vec::new(),
            grains: None,
            state_top: Value::Mapping(Mapping::new()),
            state_top_from_file: false,
            salt_pillar_root: DEFAULT_PILLAR_ROOT.to_string(),
            salt_file_root: DEFAULT_FILE_ROOT.to_string(),
            salt_config: DEFAULT_SALT_CONFIG.to_string(),
            salt_minion_config: DEFAULT_MINION_CONFIG.to_string(),
            salt_state_top: DEFAULT_STATE_TOP.to_string(),
            salt_env: DEFAULT_SALT_ENV.to_string(),
            state_collection: false,
            is_file_root: false,
            collection_name: None,
            formula: None,
            dependencies: Vec::new(),
            vendor_path: None,
            salt_copy_filter: CopyFilter::default(),
            local_salt_root: None,
            data_path: None,
            root_path: DEFAULT_ROOT_PATH.to_string(),
            kitchen_root: None,
        }
    }
}

impl SaltConfig {
    /// Whether the project is copied wholesale rather than as a formula.
    pub fn is_collection_mode(&self) -> bool {
        self.state_collection || self.is_file_root
    }
}

/// One `pillars-from-directories` entry.
///
/// A bare path lands in the standard pillar root; a `{source, dest}` pair
/// lands at `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PillarSource {
    PlainDirectory(PathBuf),
    MappedDirectory { source: PathBuf, dest: PathBuf },
}

/// An extra formula copied alongside the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub path: PathBuf,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: SaltConfig = serde_yaml::from_str("{}").expect("yaml");
        assert_eq!(cfg, SaltConfig::default());
        assert_eq!(cfg.salt_pillar_root, "/srv/pillar");
        assert_eq!(cfg.salt_state_top, "/srv/salt/top.sls");
        assert!(cfg.state_top.as_mapping().is_some_and(Mapping::is_empty));
    }

    #[test]
    fn parses_manifest_spelling() {
        let yaml = r#"
formula: apache
salt_env: dev
pillars:
  top.sls:
    base:
      '*': [apache]
pillars-from-files:
  secrets.sls: test/secrets.sls
pillars_from_directories:
  - test/pillar
  - source: test/extra
    dest: /srv/pillar/extra
salt_copy_filter: [.git, .kitchen]
dependencies:
  - path: ../formulas
    name: users
salt_version: latest
"#;
        let cfg: SaltConfig = serde_yaml::from_str(yaml).expect("yaml");
        assert_eq!(cfg.formula.as_deref(), Some("apache"));
        assert_eq!(cfg.salt_env, "dev");
        assert!(cfg.pillars.is_some());
        assert_eq!(cfg.pillars_from_files.as_ref().map(Mapping::len), Some(1));
        assert_eq!(
            cfg.pillars_from_directories,
            vec![
                PillarSource::PlainDirectory("test/pillar".into()),
                PillarSource::MappedDirectory {
                    source: "test/extra".into(),
                    dest: "/srv/pillar/extra".into(),
                },
            ]
        );
        assert_eq!(cfg.salt_copy_filter, CopyFilter::new([".git", ".kitchen"]));
        assert_eq!(
            cfg.dependencies,
            vec![Dependency {
                path: "../formulas".into(),
                name: "users".to_string(),
            }]
        );
    }

    #[test]
    fn either_flag_selects_collection_mode() {
        let mut cfg = SaltConfig::default();
        assert!(!cfg.is_collection_mode());
        cfg.is_file_root = true;
        assert!(cfg.is_collection_mode());
        cfg.is_file_root = false;
        cfg.state_collection = true;
        assert!(cfg.is_collection_mode());
    }
}
