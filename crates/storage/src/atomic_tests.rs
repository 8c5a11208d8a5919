use super::*;
use tempfile::tempdir;

#[test]
fn write_atomic_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    write_atomic(&path, b"{}").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn write_atomic_rotates_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    write_atomic(&path, b"v1").unwrap();
    write_atomic(&path, b"v2").unwrap();
    write_atomic(&path, b"v3").unwrap();
    write_atomic(&path, b"v4").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "v4");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 1)).unwrap(), "v3");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 2)).unwrap(), "v2");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 3)).unwrap(), "v1");
}

#[test]
fn write_atomic_caps_at_max_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    for i in 0..6 {
        write_atomic(&path, format!("v{i}").as_bytes()).unwrap();
    }

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "v5");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 1)).unwrap(), "v4");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 2)).unwrap(), "v3");
    assert_eq!(std::fs::read_to_string(rotate_bak_path(&path, 3)).unwrap(), "v2");
    assert!(!rotate_bak_path(&path, 4).exists());
}

#[test]
fn no_backup_created_on_first_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    write_atomic(&path, b"v1").unwrap();
    assert!(!rotate_bak_path(&path, 1).exists());
}
