//! Integration tests for the `sift` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sift() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sift"));
    // Keep the user's config and log settings out of the tests
    cmd.env_remove("RUST_LOG");
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("sift-cli-tests-no-config"));
    cmd.env("HOME", std::env::temp_dir().join("sift-cli-tests-no-home"));
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "sift failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let docs = write(dir.path(), "docs.txt", "the cat sat\nthe dog sat on the mat\n");
    let queries = write(dir.path(), "queries.txt", "the sat\nmat\nzebra\n");
    (dir, docs, queries)
}

#[test]
fn search_text_output() {
    let (_dir, docs, queries) = fixture();
    let output = sift()
        .args(["search", "--color", "never", "--docs"])
        .arg(&docs)
        .arg("--queries")
        .arg(&queries)
        .output()
        .unwrap();

    assert_eq!(
        stdout_of(&output),
        "the sat: {docid: 1, hitcount: 3} {docid: 0, hitcount: 2}\n\
         mat: {docid: 1, hitcount: 1}\n\
         zebra:\n"
    );
}

#[test]
fn search_json_output_to_file() {
    let (dir, docs, queries) = fixture();
    let out_path = dir.path().join("results.jsonl");
    let output = sift()
        .args(["search", "--format", "json", "--docs"])
        .arg(&docs)
        .arg("--queries")
        .arg(&queries)
        .arg("--output")
        .arg(&out_path)
        .output()
        .unwrap();
    assert!(stdout_of(&output).is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<serde_json::Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["query"], "the sat");
    assert_eq!(lines[0]["hits"][0]["doc_id"], 1);
    assert_eq!(lines[0]["hits"][0]["hit_count"], 3);
    assert_eq!(lines[2]["hits"].as_array().unwrap().len(), 0);
}

#[test]
fn search_reads_queries_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let (_dir, docs, _) = fixture();
    let mut child = sift()
        .args(["search", "--color", "never", "--docs"])
        .arg(&docs)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"cat\n").unwrap();

    let output = child.wait_with_output().unwrap();
    assert_eq!(stdout_of(&output), "cat: {docid: 0, hitcount: 1}\n");
}

#[test]
fn search_with_updates_finishes() {
    let (dir, docs, queries) = fixture();
    let update = write(dir.path(), "update.txt", "mat mat mat\n");
    let output = sift()
        .args(["search", "--color", "never", "--docs"])
        .arg(&docs)
        .arg("--queries")
        .arg(&queries)
        .arg("--update")
        .arg(&update)
        .output()
        .unwrap();

    // Each line comes from exactly one generation
    let text = stdout_of(&output);
    let mat_line = text.lines().find(|l| l.starts_with("mat:")).unwrap();
    assert!(
        mat_line == "mat: {docid: 1, hitcount: 1}" || mat_line == "mat: {docid: 0, hitcount: 3}",
        "unexpected line: {mat_line}"
    );
}

#[test]
fn stats_and_dump() {
    let (_dir, docs, _) = fixture();

    let stats = stdout_of(&sift().arg("stats").arg(&docs).output().unwrap());
    assert!(stats.contains("Document count:   2"));
    assert!(stats.contains("Distinct terms:   6"));

    let dump = stdout_of(&sift().args(["stats", "--dump"]).arg(&docs).output().unwrap());
    assert!(dump.contains("the\t 0:1 1:2"));
    assert!(dump.contains("1\tthe dog sat on the mat"));
}

#[test]
fn missing_docs_file_fails() {
    let output = sift()
        .args(["search", "--docs", "/nonexistent/sift/docs.txt", "--queries", "-"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open"));
}

#[test]
fn stdin_shared_by_docs_and_queries_fails() {
    let output = sift()
        .args(["search", "--docs", "-", "--queries", "-"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Standard input"));
}
