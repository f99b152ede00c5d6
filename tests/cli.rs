use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::Value;

fn combine_files() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("combine-files"));
    cmd.env_remove("RUST_LOG")
        .env_remove("COMBINE_FILES_OUTPUT_DIR");
    cmd
}

fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("src/a.txt").write_str("hello\n\nworld\n").unwrap();
    temp.child("src/b.py")
        .write_str("# comment\nx = 1\n")
        .unwrap();
    temp.child("src/image.png").write_binary(&[0x89, 0x50]).unwrap();
    temp.child("src/.hidden/secret.txt").write_str("nope").unwrap();
    temp
}

#[test]
fn writes_single_file_without_part_suffix() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result.txt").path())
        .assert()
        .success();

    temp.child("out/result.txt")
        .assert("[a.txt] hello world\n[b.py] x = 1\n");
    temp.child("out/result_part1.txt")
        .assert(predicate::path::missing());
}

#[test]
fn small_ceiling_writes_numbered_parts() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .args(["--max-tokens", "1"])
        .assert()
        .success();

    temp.child("out/result_part1.txt")
        .assert("[a.txt] hello world\n");
    temp.child("out/result_part2.txt")
        .assert("[b.py] x = 1\n");
    temp.child("out/result.txt")
        .assert(predicate::path::missing());
    temp.child("out/result_part3.txt")
        .assert(predicate::path::missing());
}

#[test]
fn file_list_restricts_processing() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .args(["-f", "b.py"])
        .assert()
        .success();

    temp.child("out/result.txt").assert("[b.py] x = 1\n");
}

#[test]
fn keep_comments_retains_hash_lines() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .args(["-f", "b.py", "--keep-comments"])
        .assert()
        .success();

    temp.child("out/result.txt")
        .assert("[b.py] # comment x = 1\n");
}

#[test]
fn missing_root_exits_with_root_not_found() {
    let temp = TempDir::new().unwrap();

    combine_files()
        .arg("--dir")
        .arg(temp.child("does-not-exist").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does-not-exist"));

    temp.child("out").assert(predicate::path::missing());
}

#[test]
fn zero_ceiling_is_a_config_error() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .args(["--max-tokens", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_tokens"));
}

#[test]
fn empty_tree_succeeds_without_output() {
    let temp = TempDir::new().unwrap();
    temp.child("src").create_dir_all().unwrap();
    temp.child("src/notes.rs").write_str("fn main() {}").unwrap();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .assert()
        .success();

    temp.child("out/result.txt")
        .assert(predicate::path::missing());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .arg("--dry-run")
        .assert()
        .success();

    temp.child("out").assert(predicate::path::missing());
}

#[test]
fn json_reports_run_statistics() {
    let temp = sample_tree();

    let assert = combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .arg("-o")
        .arg(temp.child("out/result").path())
        .arg("--json")
        .assert()
        .success();

    let stats: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(stats["files_found"], 2);
    assert_eq!(stats["lines"], 2);
    assert_eq!(stats["total_chunks"], 1);
    assert_eq!(stats["files_written"].as_array().unwrap().len(), 1);
}

#[test]
fn output_dir_env_sets_generated_name() {
    let temp = sample_tree();

    combine_files()
        .arg("--dir")
        .arg(temp.child("src").path())
        .env("COMBINE_FILES_OUTPUT_DIR", temp.child("exports").path())
        .assert()
        .success();

    let written: Vec<_> = std::fs::read_dir(temp.child("exports").path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("combined_src_"));
    assert!(written[0].ends_with(".txt"));
}
