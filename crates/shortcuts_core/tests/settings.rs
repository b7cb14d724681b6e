use serde_json::json;
use shortcuts_core::{MemoryDocumentRepository, OfflineUrlVerifier, ShortcutStore, StoreError};

fn setup() -> ShortcutStore<MemoryDocumentRepository> {
    ShortcutStore::new(
        MemoryDocumentRepository::new(),
        Box::new(OfflineUrlVerifier),
    )
    .unwrap()
}

#[test]
fn apply_then_get_returns_the_value() {
    let store = setup();
    store.apply_setting("theme", json!("dark")).unwrap();
    store
        .apply_setting("window", json!({ "width": 640, "height": 480 }))
        .unwrap();

    assert_eq!(store.get_setting("theme").unwrap(), json!("dark"));
    assert_eq!(store.get_setting("window").unwrap()["width"], json!(640));
    assert_eq!(
        store.repository().snapshot().settings["theme"],
        json!("dark")
    );
}

#[test]
fn apply_overwrites_existing_value_in_place() {
    let store = setup();
    store.apply_setting("a", json!(1)).unwrap();
    store.apply_setting("b", json!(2)).unwrap();
    store.apply_setting("a", json!(3)).unwrap();

    let settings = store.snapshot().settings;
    let keys: Vec<&String> = settings.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(settings["a"], json!(3));
}

#[test]
fn missing_setting_is_not_found() {
    let store = setup();
    let err = store.get_setting("nothing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(name) if name == "nothing"));
    assert!(!store.has_setting("nothing"));
}

#[test]
fn remove_setting_returns_previous_value() {
    let store = setup();
    store.apply_setting("opacity", json!(0.9)).unwrap();
    assert!(store.has_setting("opacity"));

    assert_eq!(store.remove_setting("opacity").unwrap(), json!(0.9));
    assert!(!store.has_setting("opacity"));
    assert!(matches!(
        store.remove_setting("opacity"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn null_is_a_stored_value() {
    let store = setup();
    store.apply_setting("hotkey", json!(null)).unwrap();
    assert!(store.has_setting("hotkey"));
    assert_eq!(store.get_setting("hotkey").unwrap(), json!(null));
}

#[test]
fn failed_write_keeps_previous_setting() {
    let store = setup();
    store.apply_setting("theme", json!("light")).unwrap();
    store.repository().set_fail_writes(true);

    assert!(matches!(
        store.apply_setting("theme", json!("dark")),
        Err(StoreError::Repo(_))
    ));
    assert_eq!(store.get_setting("theme").unwrap(), json!("light"));
}
