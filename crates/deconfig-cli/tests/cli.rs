//! End-to-end tests for the deconfig binary.
//!
//! Each test builds an export and a live directory of YAML records in a
//! temporary directory and points the binary at them through deconfig.json.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LEAKY_EXPORT: &str = "_deconfig:\n  pass: hide\npass: secret\nuser: admin\n";
const LIVE: &str = "_deconfig:\n  pass: hide\npass: live-secret\nuser: admin\n";
const CLEAN_EXPORT: &str = "_deconfig:\n  pass: hide\nuser: admin\n";

/// Temporary site with `sync/` (export), `active/` (live) and a config file.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new(redaction: bool) -> Self {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("sync")).unwrap();
        std::fs::create_dir_all(dir.path().join("active")).unwrap();
        let config = serde_json::json!({
            "export_dir": dir.path().join("sync"),
            "live_dir": dir.path().join("active"),
            "redaction": redaction,
        });
        std::fs::write(dir.path().join("deconfig.json"), config.to_string()).unwrap();
        Site { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("deconfig.json")
    }

    fn export(&self, relative: &str) -> PathBuf {
        self.dir.path().join("sync").join(relative)
    }

    fn live(&self, relative: &str) -> PathBuf {
        self.dir.path().join("active").join(relative)
    }

    fn put(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn leaky(redaction: bool) -> Self {
        let site = Site::new(redaction);
        Site::put(&site.export("db.yml"), LEAKY_EXPORT);
        Site::put(&site.live("db.yml"), LIVE);
        site
    }

    fn read_export(&self, relative: &str) -> String {
        std::fs::read_to_string(self.export(relative)).unwrap()
    }

    /// Command with the site's config and logging silenced.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("deconfig").expect("deconfig binary should exist");
        cmd.arg("--config")
            .arg(self.config())
            .env("DECONFIG_LOG", "off")
            .env_remove("RUST_LOG")
            .env_remove("DECONFIG_LOG_FORMAT");
        cmd
    }
}

// ============================================================================
// remove-hidden
// ============================================================================

mod remove_hidden {
    use super::*;

    #[test]
    fn repairs_leaked_record() {
        let site = Site::leaky(true);
        site.cmd()
            .arg("remove-hidden")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Removed hidden configuration from db (pass)",
            ))
            .stdout(predicate::str::contains("repaired 1"));

        let exported = site.read_export("db.yml");
        assert!(!exported.contains("secret"));
        assert!(exported.contains("user: admin"));
    }

    #[test]
    fn alias_drh() {
        let site = Site::leaky(true);
        site.cmd().arg("drh").assert().success();
        assert!(!site.read_export("db.yml").contains("secret"));
    }

    #[test]
    fn repairs_named_collections() {
        let site = Site::new(true);
        Site::put(&site.export("language/fr/db.yml"), LEAKY_EXPORT);
        Site::put(&site.live("language/fr/db.yml"), LIVE);

        site.cmd()
            .arg("remove-hidden")
            .assert()
            .success()
            .stdout(predicate::str::contains("language.fr:db (pass)"));
        assert!(!site.read_export("language/fr/db.yml").contains("secret"));
    }

    #[test]
    fn disabled_redaction_is_not_an_error() {
        let site = Site::leaky(false);
        site.cmd()
            .arg("remove-hidden")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
        assert_eq!(site.read_export("db.yml"), LEAKY_EXPORT);
    }
}

// ============================================================================
// check
// ============================================================================

mod check {
    use super::*;

    #[test]
    fn leaked_record_exits_one() {
        let site = Site::leaky(true);
        site.cmd()
            .arg("check")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("db (pass)"));
        // Read-only.
        assert_eq!(site.read_export("db.yml"), LEAKY_EXPORT);
    }

    #[test]
    fn clean_store_exits_zero() {
        let site = Site::new(true);
        Site::put(&site.export("db.yml"), CLEAN_EXPORT);
        site.cmd()
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn disabled_redaction_is_config_error() {
        let site = Site::leaky(false);
        site.cmd()
            .arg("check")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("redaction is disabled"));
    }
}

// ============================================================================
// show
// ============================================================================

mod show {
    use super::*;

    #[test]
    fn restores_hidden_value() {
        let site = Site::new(true);
        Site::put(&site.export("db.yml"), CLEAN_EXPORT);
        Site::put(&site.live("db.yml"), LIVE);

        site.cmd()
            .args(["show", "db"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"pass\": \"live-secret\""));
    }

    #[test]
    fn yaml_output() {
        let site = Site::new(true);
        Site::put(&site.export("db.yml"), CLEAN_EXPORT);
        Site::put(&site.live("db.yml"), LIVE);

        site.cmd()
            .args(["show", "db", "--format", "yaml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pass: live-secret"));
    }

    #[test]
    fn leaked_record_fails_unless_raw() {
        let site = Site::leaky(true);
        site.cmd()
            .args(["show", "db"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("remove-hidden"));

        site.cmd()
            .args(["show", "db", "--raw"])
            .assert()
            .success()
            .stdout(predicate::str::contains("live-secret"));
    }

    #[test]
    fn collection_record() {
        let site = Site::new(true);
        Site::put(&site.export("language/fr/db.yml"), CLEAN_EXPORT);
        Site::put(&site.live("language/fr/db.yml"), LIVE);

        site.cmd()
            .args(["show", "db", "--collection", "language.fr"])
            .assert()
            .success()
            .stdout(predicate::str::contains("live-secret"));
    }

    #[test]
    fn collection_outside_store_is_io_error() {
        let site = Site::new(true);
        site.cmd()
            .args(["show", "secret", "--collection", "..", "--log-format", "jsonl"])
            .env("DECONFIG_LOG", "error")
            .assert()
            .code(21)
            .stderr(predicate::str::contains("invalid record or collection name"))
            .stderr(predicate::str::contains("internal_error").not());
        assert!(!site.dir.path().join("secret.yml").exists());
    }

    #[test]
    fn missing_record_is_args_error() {
        let site = Site::new(true);
        site.cmd()
            .args(["show", "nope"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("record not found: nope"));
    }
}

// ============================================================================
// export
// ============================================================================

mod export {
    use super::*;

    #[test]
    fn regenerates_from_live() {
        let site = Site::new(true);
        Site::put(&site.export("stale.yml"), "old: true\n");
        Site::put(&site.live("db.yml"), LIVE);

        site.cmd()
            .arg("export")
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 1 records"))
            .stdout(predicate::str::contains("removed 1"));

        assert!(!site.export("stale.yml").exists());
        let exported = site.read_export("db.yml");
        assert!(exported.contains("user: admin"));
        assert!(!exported.contains("live-secret"));
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn unknown_command_fails() {
        Command::cargo_bin("deconfig")
            .unwrap()
            .arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        Command::cargo_bin("deconfig")
            .unwrap()
            .args(["--config"])
            .arg(dir.path().join("missing.json"))
            .arg("check")
            .env("DECONFIG_LOG", "off")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("Config file not found"));
    }

    #[test]
    fn invalid_config_file_fails() {
        let site = Site::new(true);
        std::fs::write(site.config(), "{not json").unwrap();
        site.cmd().arg("check").assert().code(11);
    }

    #[test]
    fn help_succeeds() {
        Command::cargo_bin("deconfig")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("remove-hidden"));
    }
}
