//! Test manifest loading.
//!
//! A manifest is either a bare provisioner mapping or a full kitchen-style
//! document with a top-level `provisioner` section and optional `suites`,
//! each of which may override provisioner keys.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::fs::read_to_string;
use crate::config::SaltConfig;
use crate::error::{Result, SandboxError};

/// Load the provisioner config from the YAML manifest at `path`.
///
/// With `suite` set, that suite's `provisioner` keys replace the top-level
/// ones.
pub fn load_config(path: &Path, suite: Option<&str>) -> Result<SaltConfig> {
    let contents = read_to_string(path)?;
    parse_config(&contents, suite).map_err(|err| match err {
        SandboxError::Configuration(message) => {
            SandboxError::configuration(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

pub fn parse_config(text: &str, suite: Option<&str>) -> Result<SaltConfig> {
    let document: Value = serde_yaml::from_str(text)
        .map_err(|err| SandboxError::configuration(format!("parse manifest: {err}")))?;
    let is_kitchen_document =
        document.get("provisioner").is_some() || document.get("suites").is_some();

    let mut section = if is_kitchen_document {
        provisioner_section(&document)?
    } else {
        match &document {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping.clone(),
            _ => return Err(SandboxError::configuration("manifest must be a mapping")),
        }
    };

    if let Some(name) = suite {
        let overrides = suite_overrides(&document, name)?;
        for (key, value) in overrides {
            section.insert(key, value);
        }
    }

    serde_yaml::from_value(Value::Mapping(section))
        .map_err(|err| SandboxError::configuration(format!("invalid provisioner config: {err}")))
}

fn provisioner_section(document: &Value) -> Result<Mapping> {
    match document.get("provisioner") {
        None | Some(Value::Null) => Ok(Mapping::new()),
        Some(Value::Mapping(mapping)) => Ok(mapping.clone()),
        Some(_) => Err(SandboxError::configuration("provisioner must be a mapping")),
    }
}

fn suite_overrides(document: &Value, name: &str) -> Result<Mapping> {
    let suite = document
        .get("suites")
        .and_then(Value::as_sequence)
        .and_then(|suites| {
            suites
                .iter()
                .find(|suite| suite.get("name").and_then(Value::as_str) == Some(name))
        })
        .ok_or_else(|| SandboxError::configuration(format!("suite '{name}' not found")))?;
    match suite.get("provisioner") {
        None | Some(Value::Null) => Ok(Mapping::new()),
        Some(Value::Mapping(mapping)) => Ok(mapping.clone()),
        Some(_) => Err(SandboxError::configuration(format!(
            "suite '{name}' provisioner must be a mapping"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_provisioner_mapping() {
        let cfg = parse_config("formula: apache\nsalt_env: dev\n", None).expect("parse");
        assert_eq!(cfg.formula.as_deref(), Some("apache"));
        assert_eq!(cfg.salt_env, "dev");
    }

    #[test]
    fn empty_manifest_is_default_config() {
        assert_eq!(parse_config("", None).expect("parse"), SaltConfig::default());
    }

    #[test]
    fn kitchen_document_uses_provisioner_section() {
        let text = r#"
driver:
  name: docker
provisioner:
  name: salt_solo
  formula: apache
  state_top:
    base:
      '*': [apache]
platforms:
  - name: debian
"#;
        let cfg = parse_config(text, None).expect("parse");
        assert_eq!(cfg.formula.as_deref(), Some("apache"));
        assert!(cfg.state_top.get("base").is_some());
    }

    #[test]
    fn suite_overrides_replace_top_level_keys() {
        let text = r#"
provisioner:
  formula: apache
  salt_env: base
suites:
  - name: default
  - name: ssl
    provisioner:
      salt_env: ssl
      pillars:
        top.sls: {ssl: {'*': [apache]}}
"#;
        let cfg = parse_config(text, Some("ssl")).expect("parse");
        assert_eq!(cfg.formula.as_deref(), Some("apache"));
        assert_eq!(cfg.salt_env, "ssl");
        assert!(cfg.pillars.is_some());

        let default = parse_config(text, Some("default")).expect("parse");
        assert_eq!(default.salt_env, "base");
    }

    #[test]
    fn unknown_suite_is_configuration_error() {
        let err = parse_config("provisioner: {}\nsuites: []\n", Some("nope")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn suite_on_bare_mapping_is_configuration_error() {
        let err = parse_config("formula: apache\n", Some("ssl")).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("suite 'ssl' not found"));
    }

    #[test]
    fn malformed_yaml_is_configuration_error() {
        let err = parse_config("formula: [unterminated\n", None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn wrongly_typed_field_is_configuration_error() {
        let err = parse_config("dependencies: not-a-list\n", None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_config(&temp.path().join("kitchen.yml"), None).unwrap_err();
        assert!(err.is_io());
    }
}
