//! Pillar tree assembly.
//!
//! Sources are applied in a fixed order and later writes replace earlier ones
//! at the same path:
//!
//! 1. `pillars-from-directories`, in list order
//! 2. the local salt root's `pillar/` directory, only when neither inline nor
//!    file pillars are configured
//! 3. inline `pillars`, one file per top-level key
//! 4. `pillars-from-files`, copied verbatim

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::copy::copy_directory;
use super::fs::{copy_file, write_raw_file};
use crate::config::{DEFAULT_PILLAR_ROOT, PillarSource};
use crate::core::effective::PillarSources;
use crate::core::filter::CopyFilter;
use crate::core::normalize::{key_to_string, normalize};
use crate::core::paths::SandboxRoot;
use crate::core::yaml::serialize;
use crate::error::{Result, SandboxError};
use crate::events::{EventSink, SandboxEvent, Step};

/// Files written into the pillar root by the inline and file steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PillarReport {
    pub written: Vec<PathBuf>,
    pub used_fallback: bool,
}

pub fn assemble_pillars<S: EventSink + ?Sized>(
    sandbox: &SandboxRoot,
    sources: &PillarSources,
    filter: &CopyFilter,
    sink: &S,
) -> Result<PillarReport> {
    sink.emit(SandboxEvent::StepStarted {
        step: Step::Pillars,
        detail: sources.pillar_root.clone(),
    });
    let mut report = PillarReport::default();

    for source in &sources.directories {
        let (from, dest) = match source {
            PillarSource::PlainDirectory(path) => {
                (path.as_path(), sandbox.resolve(DEFAULT_PILLAR_ROOT)?)
            }
            PillarSource::MappedDirectory { source, dest } => {
                (source.as_path(), mapped_destination(sandbox, &sources.pillar_root, dest)?)
            }
        };
        copy_directory(from, &dest, filter, sink)?;
    }

    if sources.inline.is_none() && sources.from_files.is_none() {
        if let Some(local_root) = &sources.local_salt_root {
            let from = local_root.join("pillar");
            sink.emit(SandboxEvent::PillarFallback {
                source: from.clone(),
            });
            copy_directory(&from, &sandbox.resolve(&sources.pillar_root)?, filter, sink)?;
            report.used_fallback = true;
        } else if sources.directories.is_empty() {
            sink.emit(SandboxEvent::StepSkipped {
                step: Step::Pillars,
                reason: "no pillar sources configured",
            });
        }
        return Ok(report);
    }

    if let Some(inline) = &sources.inline {
        let normalized = normalize(inline);
        let entries = normalized.entries().ok_or_else(|| {
            SandboxError::configuration("pillars must be a mapping of file name to data")
        })?;
        for (key, value) in entries {
            let text = serialize(&normalize(value), &format!("pillar {key}"))?;
            let path = sandbox.resolve_under(&sources.pillar_root, key)?;
            let bytes = write_raw_file(&path, text)?;
            sink.emit(SandboxEvent::FileWritten {
                path: path.clone(),
                bytes,
            });
            report.written.push(path);
        }
    }

    if let Some(files) = &sources.from_files {
        for (key, source) in files {
            let key = key_to_string(key);
            let source = source_path(&key, source)?;
            let path = sandbox.resolve_under(&sources.pillar_root, &key)?;
            copy_file(&source, &path)?;
            sink.emit(SandboxEvent::FileCopied {
                source,
                dest: path.clone(),
            });
            report.written.push(path);
        }
    }

    Ok(report)
}

/// Absolute-looking destinations are sandbox-relative; relative ones nest
/// under the pillar root.
fn mapped_destination(sandbox: &SandboxRoot, pillar_root: &str, dest: &Path) -> Result<PathBuf> {
    if dest.has_root() {
        sandbox.resolve(dest)
    } else {
        sandbox.resolve_under(pillar_root, dest)
    }
}

fn source_path(key: &str, value: &Value) -> Result<PathBuf> {
    value.as_str().map(PathBuf::from).ok_or_else(|| {
        SandboxError::configuration(format!(
            "pillars-from-files entry '{key}' must be a file path"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_yaml::Mapping;

    use super::*;
    use crate::events::NullSink;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("yaml")
    }

    fn sources() -> PillarSources {
        PillarSources {
            directories: Vec::new(),
            inline: None,
            from_files: None,
            pillar_root: "/srv/pillar".to_string(),
            local_salt_root: None,
        }
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    #[test]
    fn no_sources_is_a_no_op() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));
        let report =
            assemble_pillars(&sandbox, &sources(), &CopyFilter::default(), &NullSink)
                .expect("assemble");
        assert_eq!(report, PillarReport::default());
        assert!(!sandbox.path().join("srv").exists());
    }

    #[test]
    fn inline_pillars_write_one_file_per_key() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sandbox = SandboxRoot::new(temp.path());
        let mut input = sources();
        input.inline = Some(yaml(
            "top.sls:\n  base:\n    '*': [users]\nusers.sls:\n  users:\n    1: root\n",
        ));

        let report = assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink)
            .expect("assemble");

        assert_eq!(report.written.len(), 2);
        let top = fs::read_to_string(temp.path().join("srv/pillar/top.sls")).expect("top");
        assert!(top.contains("'*':"));
        assert!(!top.contains("! '*'"));
        let users: Value = serde_yaml::from_str(
            &fs::read_to_string(temp.path().join("srv/pillar/users.sls")).expect("users"),
        )
        .expect("parse users");
        assert_eq!(users, yaml("users:\n  '1': root\n"));
    }

    #[test]
    fn inline_pillars_must_be_a_mapping() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut input = sources();
        input.inline = Some(yaml("[a, b]"));
        let err = assemble_pillars(
            &SandboxRoot::new(temp.path()),
            &input,
            &CopyFilter::default(),
            &NullSink,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn file_pillars_are_copied_verbatim_into_nested_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let secret = temp.path().join("secret.sls");
        let raw = "key: |\n  line one\n  line two\n";
        write(&secret, raw);
        let mut files = Mapping::new();
        files.insert(
            Value::String("nested/secret.sls".to_string()),
            Value::String(secret.to_string_lossy().into_owned()),
        );
        let mut input = sources();
        input.from_files = Some(files);
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink).expect("assemble");

        let copied = sandbox.path().join("srv/pillar/nested/secret.sls");
        assert_eq!(fs::read_to_string(copied).expect("read"), raw);
    }

    #[test]
    fn local_salt_root_fallback_copies_pillar_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().join("base");
        write(&base.join("pillar/top.sls"), "base: {}\n");
        write(&base.join("pillar/.git/HEAD"), "ref");
        let mut input = sources();
        input.local_salt_root = Some(base);
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        let report = assemble_pillars(&sandbox, &input, &CopyFilter::new([".git"]), &NullSink)
            .expect("assemble");

        assert!(report.used_fallback);
        assert!(sandbox.path().join("srv/pillar/top.sls").is_file());
        assert!(!sandbox.path().join("srv/pillar/.git").exists());
    }

    #[test]
    fn fallback_is_ignored_when_inline_pillars_exist() {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().join("base");
        write(&base.join("pillar/other.sls"), "x: 1\n");
        let mut input = sources();
        input.local_salt_root = Some(base);
        input.inline = Some(yaml("top.sls: {base: {}}\n"));
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        let report = assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink)
            .expect("assemble");

        assert!(!report.used_fallback);
        assert!(!sandbox.path().join("srv/pillar/other.sls").exists());
    }

    #[test]
    fn directories_then_inline_then_files_last_write_wins() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("pillar-dir");
        write(&dir.join("common.sls"), "from: directory\n");
        write(&dir.join("both.sls"), "from: directory\n");
        let file = temp.path().join("both-file.sls");
        write(&file, "from: file\n");

        let mut files = Mapping::new();
        files.insert(
            Value::String("both.sls".to_string()),
            Value::String(file.to_string_lossy().into_owned()),
        );
        let mut input = sources();
        input.directories = vec![PillarSource::PlainDirectory(dir)];
        input.inline = Some(yaml("common.sls: {from: inline}\nboth.sls: {from: inline}\n"));
        input.from_files = Some(files);
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink).expect("assemble");

        let root = sandbox.path().join("srv/pillar");
        assert_eq!(
            fs::read_to_string(root.join("common.sls")).expect("read"),
            "from: inline\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("both.sls")).expect("read"),
            "from: file\n"
        );
    }

    #[test]
    fn mapped_directories_resolve_absolute_and_relative_dests() {
        let temp = tempfile::tempdir().expect("tempdir");
        let a = temp.path().join("a");
        write(&a.join("a.sls"), "a: 1\n");
        let b = temp.path().join("b");
        write(&b.join("b.sls"), "b: 1\n");
        let mut input = sources();
        input.directories = vec![
            PillarSource::MappedDirectory {
                source: a,
                dest: "/srv/alt".into(),
            },
            PillarSource::MappedDirectory {
                source: b,
                dest: "extra".into(),
            },
        ];
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink).expect("assemble");

        assert!(sandbox.path().join("srv/alt/a.sls").is_file());
        assert!(sandbox.path().join("srv/pillar/extra/b.sls").is_file());
    }

    #[test]
    fn missing_pillar_directory_aborts() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut input = sources();
        input.directories = vec![PillarSource::PlainDirectory(temp.path().join("missing"))];
        input.inline = Some(yaml("top.sls: {}\n"));
        let sandbox = SandboxRoot::new(temp.path().join("sandbox"));

        let err = assemble_pillars(&sandbox, &input, &CopyFilter::default(), &NullSink)
            .unwrap_err();

        assert!(err.is_io());
        assert!(!sandbox.path().join("srv/pillar/top.sls").exists());
    }
}
