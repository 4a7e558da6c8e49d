//! Top file assembly.

use std::path::PathBuf;

use super::fs::{read_to_string, write_raw_file};
use crate::core::effective::StateTopSource;
use crate::core::normalize::normalize;
use crate::core::paths::SandboxRoot;
use crate::core::yaml::serialize;
use crate::error::Result;
use crate::events::{EventSink, SandboxEvent, Step};

/// Render the top file text.
///
/// Inline data is normalized and serialized. A top file read from disk is
/// returned verbatim: re-serializing it could reflow multiline scalars the
/// author wrote on purpose.
pub fn render_state_top(source: &StateTopSource) -> Result<String> {
    match source {
        StateTopSource::Inline(data) => serialize(&normalize(data), "state_top"),
        StateTopSource::FromFile(path) => read_to_string(path),
    }
}

/// Render the top file and write it to the sandbox-relative `target`.
pub fn write_state_top<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    source: &StateTopSource,
    target: &str,
    sink: &S,
) -> Result<PathBuf> {
    sink.emit(SandboxEvent::StepStarted {
        step: Step::StateTop,
        detail: target.to_string(),
    });
    let text = render_state_top(source)?;
    let path = sandbox.resolve(target)?;
    let bytes = write_raw_file(&path, text)?;
    sink.emit(SandboxEvent::FileWritten {
        path: path.clone(),
        bytes,
    });
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_yaml::Value;

    use super::*;
    use crate::events::NullSink;

    #[test]
    fn inline_top_is_serialized_with_plain_wildcard() {
        let data: Value = serde_yaml::from_str("base:\n  '*':\n    - apache\n").expect("yaml");
        let text = render_state_top(&StateTopSource::Inline(data.clone())).expect("render");
        assert!(text.contains("'*':"));
        assert!(!text.contains("! '*'"));
        let reparsed: Value = serde_yaml::from_str(&text).expect("reparse");
        assert_eq!(reparsed, data);
    }

    #[test]
    fn file_top_is_copied_verbatim() {
        let temp = tempfile::tempdir().expect("tempdir");
        let top = temp.path().join("top.sls");
        let raw = "base:\n    '*':    # odd spacing kept\n        - apache\n";
        fs::write(&top, raw).expect("write");

        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));
        let path = write_state_top(
            &sandbox,
            &StateTopSource::FromFile(top),
            "/srv/salt/top.sls",
            &NullSink,
        )
        .expect("write top");

        assert_eq!(path, sandbox.path().join("srv/salt/top.sls"));
        assert_eq!(fs::read_to_string(path).expect("read"), raw);
    }

    #[test]
    fn missing_top_file_is_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = render_state_top(&StateTopSource::FromFile(temp.path().join("top.sls")))
            .unwrap_err();
        assert!(err.is_io());
    }
}
