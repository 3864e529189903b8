//! Command implementations.
//!
//! Each command writes its payload to `out` and returns the exit code for a
//! completed run; failures come back as [`CliError`].

use crate::backend::Backend;
use crate::error::CliError;
use crate::exit_codes::ExitCode;
use crate::logging::event_names;
use deconfig_core::{check, regenerate, remove_hidden, DeconfigError, SweepOutcome};
use deconfig_store::Document;
use std::io::Write;
use tracing::{info, warn};

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render a document in this format, newline-terminated.
    pub fn render(self, doc: &Document) -> Result<String, CliError> {
        let mut text = match self {
            OutputFormat::Json => {
                serde_json::to_string_pretty(doc).map_err(|e| CliError::Render(e.to_string()))?
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(doc).map_err(|e| CliError::Render(e.to_string()))?
            }
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

/// `remove-hidden`: rewrite every record that leaks hidden configuration.
///
/// A store without redaction is logged and reported as a clean run.
pub fn run_remove_hidden(backend: &Backend, out: &mut impl Write) -> Result<ExitCode, CliError> {
    let report = match remove_hidden(backend.store())? {
        SweepOutcome::Misconfigured => {
            warn!(
                event = event_names::SWEEP_MISCONFIGURED,
                "Set \"redaction\": true in deconfig.json to enable hidden configuration removal"
            );
            return Ok(ExitCode::Clean);
        }
        SweepOutcome::Completed(report) => report,
    };

    for violation in &report.repaired {
        writeln!(out, "Removed hidden configuration from {violation}")?;
    }
    writeln!(
        out,
        "Checked {} records in {} collections, repaired {}",
        report.records,
        report.collections,
        report.repaired.len()
    )?;

    info!(
        event = event_names::SWEEP_FINISHED,
        repaired = report.repaired.len(),
        "Sweep finished"
    );
    Ok(ExitCode::Clean)
}

/// `check`: list every record that leaks hidden configuration.
pub fn run_check(backend: &Backend, out: &mut impl Write) -> Result<ExitCode, CliError> {
    let storage = backend
        .deconfig()
        .ok_or(CliError::RedactionDisabled("check"))?;

    let violations = check(storage)?;
    for violation in &violations {
        writeln!(out, "{violation}")?;
    }

    info!(
        event = event_names::CHECK_FINISHED,
        violations = violations.len(),
        "Check finished"
    );
    if violations.is_empty() {
        Ok(ExitCode::Clean)
    } else {
        Ok(ExitCode::Violations)
    }
}

/// Arguments of `show`, detached from clap.
#[derive(Debug, Clone)]
pub struct ShowRequest<'a> {
    pub name: &'a str,
    pub collection: &'a str,
    /// Skip leak detection.
    pub raw: bool,
    pub format: OutputFormat,
}

/// `show`: print one record as read through the export store.
pub fn run_show(
    backend: &Backend,
    request: &ShowRequest<'_>,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    let doc = match backend.deconfig() {
        Some(storage) => {
            let scoped = storage.collection(request.collection);
            let read = if request.raw {
                scoped.read_raw(request.name)
            } else {
                scoped.read(request.name)
            };
            if let Err(DeconfigError::ConsistencyViolation { path, .. }) = &read {
                warn!(
                    event = event_names::SHOW_VIOLATION,
                    name = request.name,
                    path = %path,
                    "Use --raw to inspect the record anyway"
                );
            }
            read?
        }
        None => backend
            .store()
            .create_collection(request.collection)
            .read(request.name)?,
    };

    let doc = doc.ok_or_else(|| CliError::NotFound(request.name.to_string()))?;
    out.write_all(request.format.render(&doc)?.as_bytes())?;
    Ok(ExitCode::Clean)
}

/// `export`: regenerate the export store from the live store.
pub fn run_export(backend: &Backend, out: &mut impl Write) -> Result<ExitCode, CliError> {
    let storage = backend
        .deconfig()
        .ok_or(CliError::RedactionDisabled("export"))?;

    let report = regenerate(storage)?;
    writeln!(
        out,
        "Wrote {} records in {} collections, removed {}",
        report.written, report.collections, report.removed
    )?;

    info!(
        event = event_names::EXPORT_FINISHED,
        written = report.written,
        removed = report.removed,
        "Export finished"
    );
    Ok(ExitCode::Clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeconfigConfig;
    use deconfig_store::{DocumentStore, FileStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn backend(dir: &TempDir, redaction: bool) -> Backend {
        Backend::open(&DeconfigConfig {
            export_dir: dir.path().join("sync"),
            live_dir: dir.path().join("active"),
            redaction,
        })
    }

    fn leaky(dir: &TempDir) {
        let spec = json!({"pass": "x"});
        FileStore::new(dir.path().join("sync"))
            .write("db", &doc(json!({"_deconfig": spec, "pass": "secret", "user": "u"})))
            .unwrap();
        FileStore::new(dir.path().join("active"))
            .write("db", &doc(json!({"_deconfig": spec, "pass": "live", "user": "u"})))
            .unwrap();
    }

    #[test]
    fn test_render_formats() {
        let data = doc(json!({"a": 1}));
        assert_eq!(OutputFormat::Json.render(&data).unwrap(), "{\n  \"a\": 1\n}\n");
        assert_eq!(OutputFormat::Yaml.render(&data).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_remove_hidden_then_check() {
        let dir = TempDir::new().unwrap();
        leaky(&dir);
        let backend = backend(&dir, true);

        let mut out = Vec::new();
        assert_eq!(run_check(&backend, &mut out).unwrap(), ExitCode::Violations);
        assert_eq!(String::from_utf8(out).unwrap(), "db (pass)\n");

        let mut out = Vec::new();
        assert_eq!(run_remove_hidden(&backend, &mut out).unwrap(), ExitCode::Clean);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Removed hidden configuration from db (pass)"));
        assert!(text.contains("repaired 1"));

        let mut out = Vec::new();
        assert_eq!(run_check(&backend, &mut out).unwrap(), ExitCode::Clean);
        assert!(out.is_empty());
    }

    #[test]
    fn test_show_violation_and_raw() {
        let dir = TempDir::new().unwrap();
        leaky(&dir);
        let backend = backend(&dir, true);
        let mut request = ShowRequest {
            name: "db",
            collection: "",
            raw: false,
            format: OutputFormat::Json,
        };

        let err = run_show(&backend, &request, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::Violations);

        request.raw = true;
        let mut out = Vec::new();
        run_show(&backend, &request, &mut out).unwrap();
        let shown: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["pass"], json!("live"));
    }

    #[test]
    fn test_show_missing_record() {
        let dir = TempDir::new().unwrap();
        let request = ShowRequest {
            name: "missing",
            collection: "",
            raw: false,
            format: OutputFormat::Yaml,
        };
        let err = run_show(&backend(&dir, true), &request, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::NotFound(name) if name == "missing"));
    }

    #[test]
    fn test_plain_backend_behaviour() {
        let dir = TempDir::new().unwrap();
        leaky(&dir);
        let backend = backend(&dir, false);

        assert_eq!(
            run_remove_hidden(&backend, &mut Vec::new()).unwrap(),
            ExitCode::Clean
        );
        assert!(matches!(
            run_check(&backend, &mut Vec::new()),
            Err(CliError::RedactionDisabled("check"))
        ));

        // Plain reads show the export copy untouched.
        let request = ShowRequest {
            name: "db",
            collection: "",
            raw: false,
            format: OutputFormat::Json,
        };
        let mut out = Vec::new();
        run_show(&backend, &request, &mut out).unwrap();
        let shown: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["pass"], json!("secret"));
    }

    #[test]
    fn test_export_regenerates() {
        let dir = TempDir::new().unwrap();
        leaky(&dir);
        let backend = backend(&dir, true);

        let mut out = Vec::new();
        run_export(&backend, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Wrote 1 records in 1 collections, removed 0\n"
        );

        let exported = FileStore::new(dir.path().join("sync")).read("db").unwrap().unwrap();
        assert_eq!(exported, doc(json!({"_deconfig": {"pass": "x"}, "user": "u"})));
    }
}
