use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn detect_prints_format_id() {
    let dir = tempdir().unwrap();
    let todo = dir.path().join("todo.txt");
    let plain = dir.path().join("notes.txt");
    fs::write(&todo, "x 2024-01-02 Done thing\n").unwrap();
    fs::write(&plain, "Just some words.\n").unwrap();

    cargo_bin_cmd!("scribe")
        .arg("detect")
        .arg(todo.as_os_str())
        .assert()
        .success()
        .stdout("todotxt\n");

    cargo_bin_cmd!("scribe")
        .arg("detect")
        .arg(plain.as_os_str())
        .assert()
        .success()
        .stdout("plaintext\n");
}

#[test]
fn detect_handles_binary_files() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("pixel.png");
    fs::write(&image, [0x89u8, b'P', b'N', b'G', 0xff, 0x00]).unwrap();

    cargo_bin_cmd!("scribe")
        .arg("detect")
        .arg(image.as_os_str())
        .assert()
        .success()
        .stdout("binary\n");
}

#[test]
fn validate_prints_findings_and_succeeds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.taskpaper");
    fs::write(&input, "Project:\n-Task without space\n").unwrap();

    cargo_bin_cmd!("scribe")
        .arg("validate")
        .arg(input.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::contains("Line 2"));
}

#[test]
fn validate_clean_document_prints_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.taskpaper");
    fs::write(&input, "Project:\n- Task\n").unwrap();

    cargo_bin_cmd!("scribe")
        .arg("validate")
        .arg(input.as_os_str())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn metadata_is_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.taskpaper");
    fs::write(&input, "Home:\n- Buy milk\n").unwrap();

    let output = cargo_bin_cmd!("scribe")
        .arg("metadata")
        .arg(input.as_os_str())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["tasks"], "1");
    assert_eq!(value["projects"], "1");
}

#[test]
fn list_formats_names_every_dialect() {
    let output = cargo_bin_cmd!("scribe")
        .arg("list-formats")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    assert_eq!(stdout.lines().count(), 17);
    assert!(stdout.lines().next().unwrap().starts_with("markdown"));
    assert!(stdout.lines().last().unwrap().starts_with("plaintext"));
    assert!(stdout.contains(".ipynb"));
}
