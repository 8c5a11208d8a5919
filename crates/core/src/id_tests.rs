use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_new_has_prefix_and_fixed_length() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn define_id_from_string_round_trips() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.as_str(), "tst-abc");
    assert_eq!(id.suffix(), "abc");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::from_string("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_display_matches_as_str() {
    let id = TestId::from_string("tst-xyz");
    assert_eq!(id.to_string(), "tst-xyz");
}

#[test]
fn define_id_two_news_are_distinct() {
    assert_ne!(TestId::new(), TestId::new());
}

// --- IdBuf tests ---

#[test]
fn idbuf_new_and_as_str() {
    let b = IdBuf::new("hello");
    assert_eq!(b.as_str(), "hello");
    assert!(!b.is_empty());
}

#[test]
fn idbuf_empty() {
    let b = IdBuf::empty();
    assert!(b.is_empty());
    assert_eq!(b.as_str(), "");
}

#[test]
fn idbuf_serde_roundtrip() {
    let b = IdBuf::new("round-trip-me");
    let json = serde_json::to_string(&b).unwrap();
    let back: IdBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(b, back);
}

// --- short() tests ---

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}
