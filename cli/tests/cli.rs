//! CLI behavior through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn autoindex() -> Command {
    Command::cargo_bin("autoindex").unwrap()
}

#[test]
fn build_writes_marked_indexes_everywhere() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/b.txt"), "b").unwrap();

    autoindex().arg("build").arg(dir.path()).assert().success();

    let root_index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    let sub_index = std::fs::read_to_string(dir.path().join("sub/index.html")).unwrap();
    assert!(root_index.contains(autoindex_core::GENERATED_MARKER));
    assert!(sub_index.contains(autoindex_core::GENERATED_MARKER));
    assert!(root_index.contains("a.txt"));
    assert!(sub_index.contains("b.txt"));
}

#[test]
fn rebuild_overwrites_generated_indexes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();

    autoindex().arg("build").arg(dir.path()).assert().success();
    autoindex().arg("build").arg(dir.path()).assert().success();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains(autoindex_core::GENERATED_MARKER));
    // The second run sees the first run's output as an ordinary file.
    assert!(index.contains("index.html"));
}

#[test]
fn build_leaves_manual_indexes_alone() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/index.txt"), "hand written").unwrap();

    autoindex().arg("build").arg(dir.path()).assert().success();

    assert!(dir.path().join("index.html").exists());
    assert!(!dir.path().join("docs/index.html").exists());
}

#[test]
fn custom_templates_replace_the_embedded_page() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    let template = dir.path().join("custom.html");
    std::fs::write(&template, "<!--!GENERATED_INDEX!-->\n<main>%files%</main>\n").unwrap();

    autoindex()
        .arg("build")
        .arg(dir.path())
        .arg("--template")
        .arg(&template)
        .assert()
        .success();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.starts_with(autoindex_core::GENERATED_MARKER));
    assert!(index.contains("<main>"));
    assert!(index.contains("a.txt"));
}

#[test]
fn readme_embedding_can_be_turned_off() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README"), "hello readme").unwrap();

    autoindex()
        .arg("build")
        .arg(dir.path())
        .arg("--no-readme")
        .assert()
        .success();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(!index.contains("hello readme"));
}

#[test]
fn license_prints_the_mit_text() {
    autoindex()
        .arg("license")
        .assert()
        .success()
        .stdout(predicate::str::contains("MIT License"));
}

#[test]
fn unknown_commands_fail_with_an_error() {
    autoindex()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn build_fails_for_a_missing_directory() {
    autoindex()
        .arg("build")
        .arg("/definitely/not/here")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot index"));
}
