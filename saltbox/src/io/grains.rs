//! Static grains file.

use std::path::PathBuf;

use serde_yaml::Value;

use super::fs::write_raw_file;
use crate::core::normalize::normalize;
use crate::core::paths::SandboxRoot;
use crate::core::yaml::serialize;
use crate::error::Result;
use crate::events::{EventSink, SandboxEvent, Step};

/// Write `grains` as YAML to the sandbox-relative `grains_path`.
///
/// Returns the written path, or `None` when no grains are configured.
pub fn write_grains<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    grains: Option<&Value>,
    grains_path: &str,
    sink: &S,
) -> Result<Option<PathBuf>> {
    let Some(grains) = grains else {
        sink.emit(SandboxEvent::StepSkipped {
            step: Step::Grains,
            reason: "no grains configured",
        });
        return Ok(None);
    };
    sink.emit(SandboxEvent::StepStarted {
        step: Step::Grains,
        detail: grains_path.to_string(),
    });

    let text = serialize(&normalize(grains), "grains")?;
    let path = sandbox.resolve(grains_path)?;
    let bytes = write_raw_file(&path, text)?;
    sink.emit(SandboxEvent::FileWritten {
        path: path.clone(),
        bytes,
    });
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::events::NullSink;

    #[test]
    fn absent_grains_write_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sandbox = SandboxRoot::new(temp.path());
        let written = write_grains(&sandbox, None, "/etc/salt/grains", &NullSink).expect("grains");
        assert_eq!(written, None);
        assert!(!temp.path().join("etc").exists());
    }

    #[test]
    fn grains_are_normalized_and_written() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sandbox = SandboxRoot::new(temp.path());
        let grains: Value = serde_yaml::from_str("roles: [web]\n42: answer\n").expect("yaml");

        let written = write_grains(&sandbox, Some(&grains), "/etc/salt/grains", &NullSink)
            .expect("grains")
            .expect("path");

        assert_eq!(written, temp.path().join("etc/salt/grains"));
        let parsed: Value =
            serde_yaml::from_str(&fs::read_to_string(&written).expect("read")).expect("parse");
        let expected: Value = serde_yaml::from_str("roles: [web]\n'42': answer\n").expect("yaml");
        assert_eq!(parsed, expected);
    }
}
