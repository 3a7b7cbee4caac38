//! Tests for the `bibdata-convert` binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn bibdata_convert() -> Command {
    let mut cmd = cargo_bin_cmd!("bibdata-convert");
    cmd.env_remove("BIBDATA_OUTDIR")
        .env_remove("BIBDATA_PREFIX")
        .env_remove("BIBDATA_STYLESHEET")
        .env_remove("BIBDATA_TEMPLATE_DIR");
    cmd
}

#[test]
fn test_convert_writes_primary_and_records() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("registry.xml");
    fs::copy(fixture("registry.xml"), &source).unwrap();

    bibdata_convert()
        .arg(&source)
        .args(["--to", "yaml", "--prefix", "rec-"])
        .arg("--outdir")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote:"))
        .stdout(predicate::str::contains("rec-cc-18001.yaml"));

    assert!(dir.path().join("registry.yaml").is_file());
    assert!(dir.path().join("out").join("rec-cc-dir-10005-2019.yaml").is_file());
}

#[test]
fn test_outdir_from_environment() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("registry.xml");
    fs::copy(fixture("registry.xml"), &source).unwrap();

    bibdata_convert()
        .arg(&source)
        .env("BIBDATA_OUTDIR", dir.path().join("env-out"))
        .assert()
        .success();

    assert!(dir.path().join("env-out").join("cc-51004.yaml").is_file());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("registry.xml");
    fs::copy(fixture("registry.xml"), &source).unwrap();

    bibdata_convert()
        .arg(&source)
        .args(["--to", "xml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write:"))
        .stdout(predicate::str::contains("registry.rxl"));

    assert!(!dir.path().join("registry.rxl").exists());
}

#[test]
fn test_missing_file_fails() {
    let dir = tempdir().unwrap();

    bibdata_convert()
        .arg(dir.path().join("absent.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Failed to read"));
}

#[test]
fn test_missing_template_dir_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("registry.xml");
    fs::copy(fixture("registry.xml"), &source).unwrap();

    bibdata_convert()
        .arg(&source)
        .args(["--to", "html", "--template"])
        .arg(dir.path().join("no-templates"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot load template"));

    assert!(!dir.path().join("registry.html").exists());
}

#[test]
fn test_unknown_format_is_rejected() {
    bibdata_convert()
        .arg(fixture("registry.xml"))
        .args(["--to", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported target format"));
}
