use std::fs;

use assert_cmd::Command;
use calamine::{Reader, Xlsx, open_workbook};
use predicates::prelude::*;

fn kt(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kt").unwrap();
    cmd.current_dir(dir.path()).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_all_commands() {
    let dir = tempfile::tempdir().unwrap();
    kt(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("check")
                .and(predicate::str::contains("db2excel"))
                .and(predicate::str::contains("u2g")),
        );
}

#[test]
fn check_prints_size_and_digests() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("abc.txt"), b"abc").unwrap();

    kt(&dir)
        .args(["check", "--path", "abc.txt"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("read file size: 0.00M(step by 10240)")
                .and(predicate::str::contains(
                    "[ md5]: 900150983CD24FB0D6963F7D28E17F72",
                ))
                .and(predicate::str::contains(
                    "[sha1]: A9993E364706816ABA3E25717850C26C9CD0D89D",
                )),
        )
        .stderr(predicate::str::contains("calculating: 3/3"));
}

#[test]
fn check_on_directory_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/a.bin"), b"abc").unwrap();
    fs::write(dir.path().join("data/b.txt"), b"").unwrap();

    kt(&dir)
        .args(["check", "--path", "data", "--include", "*.bin"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[ md5]: 900150983CD24FB0D6963F7D28E17F72")
                .and(predicate::str::contains("[CHECK] scanned=2 matched=1 digested=1")),
        );
}

#[test]
fn check_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    kt(&dir)
        .args(["check", "--path", "nope.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.bin"));
}

#[test]
fn db2excel_writes_schema_named_workbook() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("dump.json"),
        r#"{"schema": "shop", "tables": [
            {"name": "users", "comment": "app users", "fields": [
                {"name": "id", "type": "int", "key": "PRI", "nullable": false, "default": null},
                {"name": "email", "type": "varchar(128)", "nullable": true}
            ]},
            {"name": "logs", "fields": []}
        ]}"#,
    )
    .unwrap();

    kt(&dir)
        .args(["db2excel", "--input", "dump.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 table(s), 2 field(s)"));

    let path = dir.path().join("shop.xlsx");
    assert!(path.is_file());
    let mut xlsx: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(xlsx.sheet_names(), vec!["index".to_string(), "detail".to_string()]);

    let range_detail = xlsx.worksheet_range("detail").unwrap();
    let l_text: Vec<String> = range_detail
        .rows()
        .flat_map(|row| row.iter().map(|c| c.to_string()))
        .collect();
    for c_expected in ["users", "logs", "id", "email", "varchar(128)", "YES", "NO"] {
        assert!(l_text.iter().any(|t| t == c_expected), "missing {c_expected}");
    }
}

#[test]
fn db2excel_schema_flag_overrides_file_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("dump.json"), r#"{"tables": []}"#).unwrap();

    kt(&dir)
        .args(["db2excel", "-i", "dump.json", "-s", "empty", "-o", "."])
        .assert()
        .success();
    assert!(dir.path().join("empty.xlsx").is_file());
}

#[test]
fn db2excel_keeps_output_inside_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("dump.json"), r#"{"schema": "../escaped", "tables": []}"#).unwrap();

    kt(&dir)
        .args(["db2excel", "-i", "dump.json", "-o", "out"])
        .assert()
        .success();
    assert!(dir.path().join("out/escaped.xlsx").is_file());
    assert!(!dir.path().join("escaped.xlsx").exists());
}

#[test]
fn u2g_requires_a_token() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.png"), b"png").unwrap();

    kt(&dir)
        .env_remove("GITHUB_TOKEN")
        .args(["u2g", "--path", "a.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing GitHub token"));
}
