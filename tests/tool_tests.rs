// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

#![cfg(feature = "tool")]

//! Integration tests for the `hashfile` CLI tool binary.

use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Run the hashfile binary with CLI arguments
fn run_cli(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_hashfile"))
        .args(args)
        .output()
        .expect("Failed to execute hashfile binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn write_dataset(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "linha,endereco,id,nascimento,nome,email,celular").unwrap();

    for line in 0..20 {
        writeln!(
            file,
            "{line},Rua {line},{},1990-01-01,Pessoa {line},p{line}@x.io,119{line:04}",
            1_000 + line * 100,
        )
        .unwrap();
    }
}

#[test]
fn tool_bench_writes_one_table_per_combination() {
    let folder = tempfile::tempdir().unwrap();
    let dataset = folder.path().join("people.csv");
    write_dataset(&dataset);

    let (stdout, stderr, ok) = run_cli(&[
        "bench",
        dataset.to_str().unwrap(),
        "--out",
        folder.path().to_str().unwrap(),
        "--capacity",
        "100",
        "--rows",
        "0..20",
        "--verify",
    ]);
    assert!(ok, "stderr: {stderr}");

    for method in ["direct", "collision-zone", "chain-head", "chain-no-head"] {
        assert!(stdout.contains(method), "stdout: {stdout}");

        for hash in ["division", "division-prime", "fold", "shift-reduce", "shift-reduce-square"] {
            assert!(folder
                .path()
                .join(format!("table_{method}_{hash}.bin"))
                .exists());
        }
    }
}

#[test]
fn tool_bench_single_combination() {
    let folder = tempfile::tempdir().unwrap();
    let dataset = folder.path().join("people.csv");
    write_dataset(&dataset);

    let (stdout, _, ok) = run_cli(&[
        "bench",
        dataset.to_str().unwrap(),
        "--out",
        folder.path().to_str().unwrap(),
        "--method",
        "chain-head",
        "--hash",
        "division",
        "--capacity",
        "100",
        "--rows",
        "0..20",
    ]);
    assert!(ok);

    // Ids step by 100 with capacity 100, so every row shares bucket 0
    let row = stdout
        .lines()
        .find(|l| l.starts_with("chain-head"))
        .expect("should print a row");
    let columns = row.split_whitespace().collect::<Vec<_>>();
    assert_eq!(Some(&"20"), columns.get(2));
    assert_eq!(Some(&"19"), columns.get(3));
    assert_eq!(Some(&"0"), columns.get(4));
    assert_eq!(Some(&"19"), columns.get(5));

    let tables = std::fs::read_dir(folder.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .map(|e| e.file_name().to_string_lossy().ends_with(".bin"))
                .unwrap_or(false)
        })
        .count();
    assert_eq!(1, tables);
}

#[test]
fn tool_put_get_del_info() {
    let folder = tempfile::tempdir().unwrap();
    let table = folder.path().join("t.bin");
    let table = table.to_str().unwrap();

    let flags = ["--method", "chain-no-head", "--capacity", "10"];

    let (stdout, _, ok) = run_cli(&[&["put", table, "42", "--name", "Ana"][..], &flags[..]].concat());
    assert!(ok);
    assert_eq!("OK", stdout.trim());

    let (stdout, _, ok) = run_cli(&[&["put", table, "52"][..], &flags[..]].concat());
    assert!(ok);
    assert_eq!("OK (collided)", stdout.trim());

    let (stdout, _, ok) = run_cli(&[&["get", table, "42"][..], &flags[..]].concat());
    assert!(ok);
    assert!(stdout.contains("Name: Ana"), "stdout: {stdout}");

    let (stdout, _, ok) = run_cli(&[&["del", table, "42"][..], &flags[..]].concat());
    assert!(ok);
    assert_eq!("OK", stdout.trim());

    let (stdout, _, ok) = run_cli(&[&["get", table, "42"][..], &flags[..]].concat());
    assert!(ok);
    assert_eq!("(not found)", stdout.trim());

    let (stdout, _, ok) = run_cli(&[&["info", table][..], &flags[..]].concat());
    assert!(ok);
    assert!(stdout.contains("Method: chain-no-head"), "stdout: {stdout}");
    assert!(stdout.contains("Capacity: 10"), "stdout: {stdout}");
    assert!(stdout.contains("Overflow records: 2"), "stdout: {stdout}");
}

#[test]
fn tool_reopen_with_wrong_capacity_fails() {
    let folder = tempfile::tempdir().unwrap();
    let table = folder.path().join("t.bin");
    let table = table.to_str().unwrap();

    let (_, _, ok) = run_cli(&["put", table, "1", "--capacity", "10"]);
    assert!(ok);

    let (_, stderr, ok) = run_cli(&["get", table, "1", "--capacity", "20"]);
    assert!(!ok);
    assert!(stderr.contains("CapacityMismatch"), "stderr: {stderr}");
}

#[test]
fn tool_storage_fault_exits_with_error() {
    use std::io::{Seek, SeekFrom};

    let folder = tempfile::tempdir().unwrap();
    let path = folder.path().join("t.bin");
    let table = path.to_str().unwrap();

    let flags = ["--method", "chain-no-head", "--capacity", "10"];

    let (_, _, ok) = run_cli(&[&["put", table, "42"][..], &flags[..]].concat());
    assert!(ok);

    // Bucket 2 sits after the 4-byte header and two 8-byte pointers,
    // point it into the header
    {
        let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.seek(SeekFrom::Start(4 + 2 * 8)).unwrap();
        file.write_all(&5u64.to_le_bytes()).unwrap();
    }

    let (stdout, stderr, ok) = run_cli(&[&["get", table, "42"][..], &flags[..]].concat());
    assert!(!ok, "stdout: {stdout}");
    assert!(stderr.contains("CorruptChain"), "stderr: {stderr}");

    let (_, stderr, ok) = run_cli(&[&["del", table, "42"][..], &flags[..]].concat());
    assert!(!ok);
    assert!(stderr.contains("CorruptChain"), "stderr: {stderr}");
}
