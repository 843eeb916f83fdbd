//! Runs the `catalog-stage` binary and checks its exit status.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_catalog-stage"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run catalog-stage")
}

/// A project with one valid catalog under `po/`.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("po")).unwrap();
    fs::write(
        tmp.path().join("po/nl.po"),
        "msgid \"\"\nmsgstr \"Content-Type: text/plain; charset=UTF-8\\n\"\n\nmsgid \"Play\"\nmsgstr \"Afspelen\"\n",
    )
    .unwrap();
    tmp
}

const BUILD: &[&str] = &["build", "--app-id", "dev.example.app"];

#[test]
fn successful_build_exits_zero() {
    let tmp = project();
    let out = run_cli(tmp.path(), BUILD);

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(
        tmp.path()
            .join("data/locale/nl/LC_MESSAGES/dev.example.app.develop.mo")
            .is_file()
    );
    assert!(
        tmp.path()
            .join("AppDir/share/locale/nl/LC_MESSAGES/dev.example.app.mo")
            .is_file()
    );
}

#[test]
fn broken_catalog_exits_one() {
    let tmp = project();
    fs::write(tmp.path().join("po/xx.po"), b"msgid \"a\"\nmsgstr \"\xff\"\n").unwrap();

    let out = run_cli(tmp.path(), BUILD);

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Failed units"), "{stdout}");
    assert!(
        tmp.path()
            .join("data/locale/nl/LC_MESSAGES/dev.example.app.mo")
            .is_file()
    );
}

#[test]
fn missing_app_id_exits_two() {
    let tmp = project();
    let out = run_cli(tmp.path(), &["build"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(!tmp.path().join("data").exists());
}

#[test]
fn missing_source_dir_exits_two() {
    let tmp = TempDir::new().unwrap();
    let out = run_cli(tmp.path(), BUILD);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn check_exit_status_follows_catalogs() {
    let tmp = project();
    assert_eq!(run_cli(tmp.path(), &["check"]).status.code(), Some(0));

    fs::write(tmp.path().join("po/xx.po"), b"msgid \"a\"\nmsgstr \"\xff\"\n").unwrap();
    assert_eq!(run_cli(tmp.path(), &["check"]).status.code(), Some(1));
}

#[test]
fn gen_config_needs_no_config() {
    let tmp = TempDir::new().unwrap();
    let out = run_cli(tmp.path(), &["gen-config"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("source_dir = \"po\""));
}
