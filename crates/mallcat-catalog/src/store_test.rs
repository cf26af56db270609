use serde_json::json;
use tempfile::tempdir;

use super::*;

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempdir().unwrap();
    let catalog = Catalog::load(&dir.path().join("products.json")).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn invalid_json_is_fatal_and_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("products.json");
    std::fs::write(&path, "[{\"id\": ").unwrap();

    let err = Catalog::load(&path).unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }), "got: {err:?}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[{\"id\": ");
}

#[test]
fn non_array_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("products.json");
    std::fs::write(&path, r#"{"products": []}"#).unwrap();
    let err = Catalog::load(&path).unwrap_err();
    assert!(matches!(err, CatalogError::NotAnArray { .. }), "got: {err:?}");
}

#[test]
fn save_backs_up_previous_content_byte_for_byte() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("products.json");
    let original = "[\n  {\"id\": \"a_1\", \"name\": \"x\", \"legacy\": true}\n]";
    std::fs::write(&path, original).unwrap();

    let mut catalog = Catalog::load(&path).unwrap();
    catalog.entries_mut().push(json!({"id": "a_2", "name": "y"}));
    let backup = catalog.save(&dir.path().join("backups")).unwrap().unwrap();

    assert_eq!(std::fs::read_to_string(&backup).unwrap(), original);
    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("products-backup-") && name.ends_with(".json"), "{name}");

    let reloaded = Catalog::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    // Foreign fields survive.
    assert_eq!(reloaded.entries()[0]["legacy"], json!(true));
}

#[test]
fn save_without_previous_file_has_no_backup() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("products.json");
    let mut catalog = Catalog::load(&path).unwrap();
    catalog.entries_mut().push(json!({"id": "a_1"}));
    assert!(catalog.save(dir.path()).unwrap().is_none());
    assert!(path.exists());
}

#[test]
fn consecutive_backups_do_not_collide() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("products.json");
    std::fs::write(&path, "[]").unwrap();
    let first = backup_file(&path, dir.path()).unwrap().unwrap();
    let second = backup_file(&path, dir.path()).unwrap().unwrap();
    assert_ne!(first, second);
}

#[test]
fn entry_accessors_understand_legacy_shapes() {
    let current = json!({"id": "kkimchi_1", "name": "포기김치", "mall": {"id": "kkimchi"}});
    let legacy = json!({"id": "108341", "title": "스톤크릭 캡슐", "mallId": "wonju"});
    let legacy_nested = json!({"id": "3-1", "title": "깍두기", "mall": {"mallId": 3}});

    assert_eq!(entry_id(&current), Some("kkimchi_1"));
    assert_eq!(entry_name(&current), Some("포기김치"));
    assert_eq!(entry_mall(&current).as_deref(), Some("kkimchi"));
    assert_eq!(entry_name(&legacy), Some("스톤크릭 캡슐"));
    assert_eq!(entry_mall(&legacy).as_deref(), Some("wonju"));
    assert_eq!(entry_mall(&legacy_nested).as_deref(), Some("3"));
    assert_eq!(entry_mall(&json!({"id": "x"})), None);
}

#[test]
fn remove_mall_filters_only_that_mall() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("products.json");
    std::fs::write(
        &path,
        json!([
            {"id": "a_1", "mall": {"id": "a"}},
            {"id": "b_1", "mall": {"id": "b"}},
            {"id": "a_2", "mallId": "a"}
        ])
        .to_string(),
    )
    .unwrap();

    let mut catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog.mall_entries("a").count(), 2);
    assert_eq!(catalog.remove_mall("a"), 2);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.remove_mall("a"), 0);
}
