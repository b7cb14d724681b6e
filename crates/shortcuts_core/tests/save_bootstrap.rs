use serde_json::{json, Value};
use shortcuts_core::{
    DocumentRepository, JsonFileRepository, OfflineUrlVerifier, SaveDocument, ShortcutStore,
    StoreConfig,
};
use std::fs;
use std::path::Path;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn empty_json() -> Value {
    json!({ "settings": {}, "groups": {}, "tasks": {} })
}

fn offline_config(path: &Path) -> StoreConfig {
    let mut config = StoreConfig::new(path);
    config.offline = true;
    config
}

#[test]
fn missing_file_is_created_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");

    let store = ShortcutStore::open(&offline_config(&path)).unwrap();

    assert!(store.load_groups().is_empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/addons/shortcuts/save.json");

    JsonFileRepository::open(&path).unwrap();
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn malformed_json_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    fs::write(&path, "{ \"settings\": {,").unwrap();

    let store = ShortcutStore::open(&offline_config(&path)).unwrap();

    assert!(store.load_tasks().is_empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn missing_top_level_key_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    fs::write(&path, r#"{"settings": {"theme": "dark"}, "groups": {}}"#).unwrap();

    let store = ShortcutStore::open(&offline_config(&path)).unwrap();

    assert!(!store.has_setting("theme"));
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn non_utf8_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let repo = JsonFileRepository::open(&path).unwrap();

    assert_eq!(repo.load().unwrap(), SaveDocument::empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn valid_file_is_loaded_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let original = json!({
        "settings": { "opacity": 0.8 },
        "groups": { "G_work": { "group_name": "Work", "group_tasks": ["T_mail"] } },
        "tasks": { "T_mail": {
            "task_name": "Mail",
            "button_text": null,
            "url": ["https://mail.example.com"],
            "file_path": null,
            "directory_path": null
        } },
        "schema_note": "kept"
    });
    fs::write(&path, serde_json::to_string(&original).unwrap()).unwrap();

    let store = ShortcutStore::open(&offline_config(&path)).unwrap();
    assert_eq!(store.load_groups(), vec!["G_work".to_string()]);
    assert_eq!(store.get_setting("opacity").unwrap(), json!(0.8));

    store.apply_setting("opacity", json!(0.5)).unwrap();
    let rewritten = read_json(&path);
    assert_eq!(rewritten["schema_note"], json!("kept"));
    assert_eq!(rewritten["tasks"], original["tasks"]);
}

#[test]
fn reload_repairs_a_file_corrupted_after_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let store = ShortcutStore::open(&offline_config(&path)).unwrap();
    store.create_group("Work").unwrap();

    fs::write(&path, "not json").unwrap();
    store.reload().unwrap();

    assert!(store.load_groups().is_empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn deleted_file_is_recreated_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let repo = JsonFileRepository::open(&path).unwrap();
    let store = ShortcutStore::new(repo, Box::new(OfflineUrlVerifier)).unwrap();
    store.create_group("Work").unwrap();

    fs::remove_file(&path).unwrap();
    store.reload().unwrap();

    assert!(store.load_groups().is_empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn writes_are_pretty_printed_with_four_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let store = ShortcutStore::open(&offline_config(&path)).unwrap();
    store.apply_setting("theme", json!("dark")).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n    \"settings\": {\n        \"theme\": \"dark\""));
}

#[test]
fn deleted_file_is_noticed_without_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let store = ShortcutStore::open(&offline_config(&path)).unwrap();
    store.create_group("Work").unwrap();

    fs::remove_file(&path).unwrap();

    assert!(store.load_groups().is_empty());
    assert_eq!(read_json(&path), empty_json());
}

#[test]
fn corrupted_file_is_not_overwritten_with_stale_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let store = ShortcutStore::open(&offline_config(&path)).unwrap();
    store.create_group("Work").unwrap();

    fs::write(&path, "garbage").unwrap();
    store.apply_setting("theme", json!("dark")).unwrap();

    let saved = read_json(&path);
    assert_eq!(saved["groups"], json!({}));
    assert_eq!(saved["settings"], json!({ "theme": "dark" }));
}

#[test]
fn edits_from_another_writer_are_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.json");
    let store = ShortcutStore::open(&offline_config(&path)).unwrap();

    let other = ShortcutStore::open(&offline_config(&path)).unwrap();
    let group = other.create_group("Shared").unwrap();

    assert_eq!(store.load_groups(), vec![group.id]);
}
