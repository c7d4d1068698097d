mod support;

use std::fs;

use todos::config::{Config, CONFIG_FILE};
use todos::view::{Filter, SortKey};

use support::{titles, TestStore};

#[test]
fn load_from_dir_defaults_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "[store]\nkey = 123").expect("write invalid config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.store.key, "tasks");
    assert_eq!(cfg.ui.notification_ms, 5000);
}

#[test]
fn load_from_dir_defaults_on_unsafe_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "[store]\nkey = \"../escape\"")
        .expect("write config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.store.key, "tasks");
}

#[test]
fn load_reads_every_section() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(
        &path,
        "[store]\nkey = \"work\"\n\n[view]\nfilter = \"completed\"\nsort = \"dueDate\"\n",
    )
    .expect("write config");

    let loaded = Config::load(&path).expect("load");
    assert_eq!(loaded.store.key, "work");
    assert_eq!(loaded.view.filter, Filter::Completed);
    assert_eq!(loaded.view.sort, SortKey::DueDate);
}

#[test]
fn key_with_spaces_falls_back_to_default_store() {
    let store = TestStore::new();
    store
        .write_config("[store]\nkey = \"my tasks\"\n")
        .expect("write config");

    store
        .cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicates::str::contains("Total: 0 | Active: 0 | Completed: 0"));

    store.add("fallback", "2026-01-05", "low");
    assert!(store.blob_path("tasks").exists());
}

#[test]
fn config_supplies_key_and_initial_view() {
    let store = TestStore::new();
    store
        .write_config(
            r#"
[store]
key = "home"

[view]
filter = "active"
sort = "priority"
"#,
        )
        .expect("write config");

    store.add("low", "2026-01-05", "low");
    store.add("high", "2026-01-05", "high");
    assert!(store.blob_path("home").exists());
    assert!(!store.blob_path("tasks").exists());

    let list = store.json(&["list"]);
    assert_eq!(list["data"]["filter"], "active");
    assert_eq!(list["data"]["sort"], "priority");
    assert_eq!(titles(&list), vec!["high", "low"]);

    // Flags win over config; createdAt lists newest first.
    let list = store.json(&["list", "--sort", "createdAt"]);
    assert_eq!(titles(&list), vec!["high", "low"]);
}
