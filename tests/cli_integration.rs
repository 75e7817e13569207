//! CLI integration tests for facepack
//!
//! These tests drive the binary end to end: project setup, pack editing,
//! ordering by links and merging packs.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the facepack binary
fn facepack_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("facepack"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Get a command running inside `dir`
fn in_project(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = facepack_cmd();
    cmd.current_dir(dir.path());
    cmd
}

/// Create a temporary directory and initialize a facepack project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    facepack_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Create a project holding pack `faces` with group `Alice`
fn setup_pack() -> TempDir {
    let dir = setup_project();
    in_project(&dir).args(["pack", "new", "faces"]).assert().success();
    in_project(&dir)
        .args(["group", "add", "faces", "Alice"])
        .assert()
        .success();
    dir
}

fn add_item(dir: &TempDir, pack: &str, group: &str, id: &str, extra: &[&str]) {
    let image = format!("{}/{}.png", group, id);
    in_project(dir)
        .args(["item", "add", pack, group, id, "--image", &image])
        .args(extra)
        .assert()
        .success();
}

fn run_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = in_project(dir)
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn item_ids(dir: &TempDir, pack: &str, group: &str) -> Vec<String> {
    let shown = run_json(dir, &["pack", "show", pack]);
    let groups = shown["groups"].as_array().unwrap();
    let group = groups.iter().find(|g| g["id"] == group).unwrap();
    group["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

fn pack_file(dir: &TempDir, pack: &str) -> String {
    fs::read_to_string(dir.path().join(".facepack/packs").join(format!("{}.json", pack))).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    facepack_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized facepack project"));

    assert!(dir.path().join(".facepack").is_dir());
    assert!(dir.path().join(".facepack/packs").is_dir());
    assert!(dir.path().join(".facepack/snapshots").is_dir());
    assert!(dir.path().join(".facepack/config.toml").is_file());
    assert!(dir.path().join(".facepack/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    facepack_cmd().arg("init").arg(dir.path()).assert().success();
    facepack_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_not_in_project_error() {
    let dir = TempDir::new().unwrap();

    in_project(&dir)
        .args(["pack", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a facepack project"));
}

// =============================================================================
// Pack Tests
// =============================================================================

#[test]
fn test_pack_new_and_list() {
    let dir = setup_project();

    in_project(&dir)
        .args(["pack", "new", "faces", "--name", "Main cast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created pack: faces"));

    assert!(dir.path().join(".facepack/packs/faces.json").is_file());

    in_project(&dir)
        .args(["pack", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("faces"))
        .stdout(predicate::str::contains("Main cast"));
}

#[test]
fn test_pack_new_twice_fails() {
    let dir = setup_project();

    in_project(&dir).args(["pack", "new", "faces"]).assert().success();
    in_project(&dir)
        .args(["pack", "new", "faces"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_pack_invalid_id() {
    let dir = setup_project();

    in_project(&dir)
        .args(["pack", "new", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pack id"));
}

#[test]
fn test_pack_show_missing() {
    let dir = setup_project();

    in_project(&dir)
        .args(["pack", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pack not found: nope"));
}

#[test]
fn test_pack_remove() {
    let dir = setup_pack();

    in_project(&dir)
        .args(["pack", "remove", "faces"])
        .assert()
        .success();
    assert!(!dir.path().join(".facepack/packs/faces.json").exists());

    in_project(&dir)
        .args(["pack", "remove", "faces"])
        .assert()
        .failure();
}

#[test]
fn test_pack_snapshot() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &[]);

    let result = run_json(&dir, &["pack", "snapshot", "faces"]);
    let path = result["snapshot"].as_str().unwrap();

    assert!(Path::new(path).is_file());
    assert!(path.contains("faces-"));
    assert!(fs::read_to_string(path).unwrap().contains("happy"));
}

// =============================================================================
// Group and Item Tests
// =============================================================================

#[test]
fn test_group_priorities_are_spaced() {
    let dir = setup_pack();

    let bob = run_json(&dir, &["group", "add", "faces", "Bob"]);
    assert_eq!(bob["priority"], 2000);
    assert_eq!(bob["explicit"], false);

    let carol = run_json(&dir, &["group", "add", "faces", "Carol", "--priority", "2500"]);
    assert_eq!(carol["priority"], 2500);
    assert_eq!(carol["explicit"], true);

    let dave = run_json(&dir, &["group", "add", "faces", "Dave"]);
    assert_eq!(dave["priority"], 3000);
}

#[test]
fn test_duplicate_group_fails() {
    let dir = setup_pack();

    in_project(&dir)
        .args(["group", "add", "faces", "Alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate id 'Alice'"));
}

#[test]
fn test_explicit_then_spaced_priorities_and_rename() {
    let dir = setup_pack();

    add_item(&dir, "faces", "Alice", "happy", &["--priority", "500"]);
    add_item(&dir, "faces", "Alice", "sad", &[]);
    add_item(&dir, "faces", "Alice", "angry", &[]);

    let sad = run_json(&dir, &["get", "faces", "Alice/sad"]);
    assert_eq!(sad["priority"], 1000);
    let angry = run_json(&dir, &["get", "faces", "Alice/angry"]);
    assert_eq!(angry["priority"], 2000);

    assert_eq!(item_ids(&dir, "faces", "Alice"), vec!["happy", "sad", "angry"]);

    in_project(&dir)
        .args(["item", "rename", "faces", "Alice/angry", "calm"])
        .assert()
        .success();

    assert_eq!(item_ids(&dir, "faces", "Alice"), vec!["happy", "sad", "calm"]);

    in_project(&dir)
        .args(["get", "faces", "Alice/angry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_get_item() {
    let dir = setup_pack();
    add_item(
        &dir,
        "faces",
        "Alice",
        "happy",
        &["--name", "Happy Alice", "--description", "Smiling"],
    );

    let item = run_json(&dir, &["get", "faces", "Alice/happy"]);
    assert_eq!(item["id"], "happy");
    assert_eq!(item["group"], "Alice");
    assert_eq!(item["image"], "Alice/happy.png");
    assert_eq!(item["name"], "Happy Alice");

    in_project(&dir)
        .args(["get", "faces", "Alice/happy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Happy Alice"))
        .stdout(predicate::str::contains("Smiling"));
}

#[test]
fn test_get_without_delimiter_fails() {
    let dir = setup_pack();

    in_project(&dir)
        .args(["get", "faces", "Alice"])
        .assert()
        .failure();
}

#[test]
fn test_duplicate_item_fails() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &[]);

    in_project(&dir)
        .args(["item", "add", "faces", "Alice", "happy", "--image", "other.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate id 'happy' in 'Alice'"));
}

#[test]
fn test_item_remove() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &[]);
    add_item(&dir, "faces", "Alice", "sad", &[]);

    in_project(&dir)
        .args(["item", "remove", "faces", "Alice/happy"])
        .assert()
        .success();

    assert_eq!(item_ids(&dir, "faces", "Alice"), vec!["sad"]);
}

#[test]
fn test_group_rename_keeps_items() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &[]);

    in_project(&dir)
        .args(["group", "rename", "faces", "Alice", "Alicia"])
        .assert()
        .success();

    let item = run_json(&dir, &["get", "faces", "Alicia/happy"]);
    assert_eq!(item["group"], "Alicia");
}

#[test]
fn test_automatic_priority_not_persisted() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &["--priority", "500"]);
    add_item(&dir, "faces", "Alice", "sad", &[]);

    let content = pack_file(&dir, "faces");
    assert!(content.contains("\"priority\": 500"));
    assert!(!content.contains("1000"));
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_order_by_links_and_apply() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "a", &[]);
    add_item(&dir, "faces", "Alice", "b", &["--before", "a"]);
    add_item(&dir, "faces", "Alice", "c", &["--after", "a"]);

    // Priorities alone still follow arrival
    assert_eq!(item_ids(&dir, "faces", "Alice"), vec!["a", "b", "c"]);

    let result = run_json(&dir, &["order", "faces", "--group", "Alice"]);
    assert_eq!(result["order"], serde_json::json!(["b", "a", "c"]));
    assert_eq!(result["applied"], false);

    in_project(&dir)
        .args(["order", "faces", "--group", "Alice", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied order"));

    assert_eq!(item_ids(&dir, "faces", "Alice"), vec!["b", "a", "c"]);

    let b = run_json(&dir, &["get", "faces", "Alice/b"]);
    assert_eq!(b["priority"], 1000);
    assert_eq!(b["explicit"], true);
}

#[test]
fn test_order_groups() {
    let dir = setup_pack();
    in_project(&dir)
        .args(["group", "add", "faces", "Bob", "--before", "Alice"])
        .assert()
        .success();

    let result = run_json(&dir, &["order", "faces"]);
    assert_eq!(result["order"], serde_json::json!(["Bob", "Alice"]));
}

#[test]
fn test_order_cycle_warns() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "x", &["--after", "y"]);
    add_item(&dir, "faces", "Alice", "y", &["--after", "x"]);

    in_project(&dir)
        .args(["order", "faces", "--group", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x"))
        .stderr(predicate::str::contains("cycle"));

    let result = run_json(&dir, &["order", "faces", "--group", "Alice"]);
    assert_eq!(result["order"], serde_json::json!(["x", "y"]));
    assert_eq!(result["cycles"], serde_json::json!([["x", "y"]]));
}

#[test]
fn test_order_strict_fails_on_cycle() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "x", &["--after", "y"]);
    add_item(&dir, "faces", "Alice", "y", &["--after", "x"]);

    in_project(&dir)
        .args(["order", "faces", "--group", "Alice", "--strict", "--apply"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 cycle(s)"));

    // Nothing was applied
    let x = run_json(&dir, &["get", "faces", "Alice/x"]);
    assert_eq!(x["explicit"], false);
}

#[test]
fn test_order_strict_from_config() {
    let dir = setup_pack();
    fs::write(
        dir.path().join(".facepack/config.toml"),
        "[ordering]\nstrict = true\n",
    )
    .unwrap();
    add_item(&dir, "faces", "Alice", "z", &["--after", "ghost"]);

    in_project(&dir)
        .args(["order", "faces", "--group", "Alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 dangling link(s)"));
}

#[test]
fn test_order_dangling_warns() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "z", &["--after", "ghost"]);

    in_project(&dir)
        .args(["order", "faces", "--group", "Alice"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ghost"));

    let result = run_json(&dir, &["order", "faces", "--group", "Alice"]);
    assert_eq!(result["order"], serde_json::json!(["z"]));
    assert_eq!(result["dangling"], serde_json::json!(["ghost"]));
}

#[test]
fn test_priority_step_from_config() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".facepack/config.toml"),
        "[ordering]\npriority_step = 10\n",
    )
    .unwrap();
    in_project(&dir).args(["pack", "new", "faces"]).assert().success();

    let alice = run_json(&dir, &["group", "add", "faces", "Alice"]);
    assert_eq!(alice["priority"], 10);
    let bob = run_json(&dir, &["group", "add", "faces", "Bob"]);
    assert_eq!(bob["priority"], 20);
}

#[test]
fn test_invalid_config_fails() {
    let dir = setup_project();
    fs::write(
        dir.path().join(".facepack/config.toml"),
        "[ordering]\npriority_step = 0\n",
    )
    .unwrap();

    in_project(&dir)
        .args(["pack", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("priority_step must be positive"));
}

// =============================================================================
// Merge Tests
// =============================================================================

#[test]
fn test_merge_disjoint_packs() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &["--priority", "500"]);

    in_project(&dir).args(["pack", "new", "extra"]).assert().success();
    in_project(&dir)
        .args(["group", "add", "extra", "Alice"])
        .assert()
        .success();
    in_project(&dir)
        .args(["group", "add", "extra", "Bob"])
        .assert()
        .success();
    add_item(&dir, "extra", "Alice", "angry", &[]);
    add_item(&dir, "extra", "Bob", "neutral", &[]);

    in_project(&dir)
        .args(["merge", "all", "faces", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 packs into all"));

    let happy = run_json(&dir, &["get", "all", "Alice/happy"]);
    assert_eq!(happy["priority"], 500);
    let neutral = run_json(&dir, &["get", "all", "Bob/neutral"]);
    assert_eq!(neutral["group"], "Bob");

    // Sources are left alone
    assert!(!pack_file(&dir, "faces").contains("angry"));
}

#[test]
fn test_merge_collision_fails() {
    let dir = setup_pack();
    add_item(&dir, "faces", "Alice", "happy", &[]);

    in_project(&dir).args(["pack", "new", "other"]).assert().success();
    in_project(&dir)
        .args(["group", "add", "other", "Alice"])
        .assert()
        .success();
    add_item(&dir, "other", "Alice", "happy", &[]);

    in_project(&dir)
        .args(["merge", "all", "faces", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate id 'happy'"));

    assert!(!dir.path().join(".facepack/packs/all.json").exists());
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_verbose_flag() {
    let dir = setup_pack();

    in_project(&dir)
        .args(["--verbose", "pack", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose]"));
}

#[test]
fn test_json_success_message() {
    let dir = setup_project();

    let result = run_json(&dir, &["pack", "new", "faces"]);
    assert_eq!(result["id"], "faces");
}
