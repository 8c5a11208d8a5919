use super::*;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Doc {
    count: u32,
    name: String,
}

#[test]
fn load_missing_file_returns_default() {
    let dir = tempdir().unwrap();
    let store: Sidecar<Doc> = Sidecar::new(dir.path().join("doc.json"));
    assert_eq!(store.load().unwrap(), Doc::default());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store: Sidecar<Doc> = Sidecar::new(dir.path().join("doc.json"));
    let doc = Doc { count: 7, name: "x".to_string() };
    store.save(&doc).unwrap();
    assert_eq!(store.load().unwrap(), doc);
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    std::fs::write(&path, b"not json").unwrap();
    let store: Sidecar<Doc> = Sidecar::new(path);
    assert!(matches!(store.load(), Err(SidecarError::Parse { .. })));
}
