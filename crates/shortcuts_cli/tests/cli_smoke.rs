use std::path::Path;
use std::process::{Command, Output};

fn shortcuts(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shortcuts"))
        .arg("--store")
        .arg(store)
        .arg("--offline")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn group_and_task_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("save.json");

    let group_id = stdout(&shortcuts(&store, &["add-group", "Work"]))
        .trim()
        .to_string();
    assert!(group_id.starts_with("G_"));

    let task_line = stdout(&shortcuts(
        &store,
        &["add-task", &group_id, "Mail", "--url", "mail.example.com"],
    ));
    let fields: Vec<&str> = task_line.trim_end().split('\t').collect();
    assert!(fields[0].starts_with("T_"));
    assert_eq!(fields[1], "Mail");
    assert_eq!(fields[2], "http://mail.example.com");

    let groups = stdout(&shortcuts(&store, &["groups"]));
    assert_eq!(groups, format!("{group_id}\tWork\t1\n"));

    stdout(&shortcuts(&store, &["delete-group", &group_id]));
    assert_eq!(stdout(&shortcuts(&store, &["tasks"])), "");
}

#[test]
fn settings_roundtrip_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("save.json");

    stdout(&shortcuts(&store, &["setting", "set", "opacity", "0.75"]));
    assert_eq!(
        stdout(&shortcuts(&store, &["setting", "get", "opacity"])),
        "0.75\n"
    );
    stdout(&shortcuts(&store, &["setting", "remove", "opacity"]));

    let missing = shortcuts(&store, &["setting", "get", "opacity"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("'opacity' not found"));
}

#[test]
fn unknown_group_fails_with_a_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("save.json");

    let output = shortcuts(&store, &["show-group", "G_missing"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("G_missing not found in save file"));
}

#[test]
fn addon_order_does_not_touch_the_save_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("save.json");
    let addons = dir.path().join("addons");
    for name in ["clock", "notes"] {
        std::fs::create_dir_all(addons.join(name)).unwrap();
        std::fs::write(addons.join(name).join(format!("{name}.py")), "").unwrap();
    }

    let listed = stdout(&shortcuts(&store, &["addon-order", addons.to_str().unwrap()]));
    // default priorities load notes first
    assert_eq!(listed, "addons.notes.notes\naddons.clock.clock\n");
    assert!(!store.exists());

    let missing = dir.path().join("none");
    let listed = stdout(&shortcuts(&store, &["addon-order", missing.to_str().unwrap()]));
    assert!(listed.is_empty());
}
