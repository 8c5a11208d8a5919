use super::*;
use indexmap::IndexSet;

fn aliases(names: &[&str]) -> IndexSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn resolves_real_id_and_alias() {
    let a = ModelId::new("llama-3-8b");
    let b = ModelId::new("qwen-7b");
    let a_aliases = aliases(&["llama", "chat"]);
    let b_aliases = aliases(&[]);
    let idx = AliasIndex::build([(&a, &a_aliases), (&b, &b_aliases)]).unwrap();

    assert_eq!(idx.resolve("llama-3-8b"), Some(&a));
    assert_eq!(idx.resolve("llama"), Some(&a));
    assert_eq!(idx.resolve("chat"), Some(&a));
    assert_eq!(idx.resolve("qwen-7b"), Some(&b));
    assert_eq!(idx.resolve("nope"), None);
}

#[test]
fn rejects_alias_colliding_with_real_id() {
    let a = ModelId::new("llama-3-8b");
    let b = ModelId::new("qwen-7b");
    let a_aliases = aliases(&["qwen-7b"]);
    let b_aliases = aliases(&[]);
    let err = AliasIndex::build([(&a, &a_aliases), (&b, &b_aliases)]).unwrap_err();
    assert_eq!(err.len(), 1);
}

#[test]
fn rejects_duplicate_model_id() {
    let a = ModelId::new("dup");
    let b = ModelId::new("dup");
    let none = aliases(&[]);
    let err = AliasIndex::build([(&a, &none), (&b, &none)]).unwrap_err();
    assert!(err.iter().any(|m| m.contains("duplicate model id")));
}

#[test]
fn longest_prefix_match_prefers_longer_alias() {
    let a = ModelId::new("model-a");
    let b = ModelId::new("model-b");
    let a_aliases = aliases(&["foo/bar"]);
    let b_aliases = aliases(&["foo"]);
    let idx = AliasIndex::build([(&a, &a_aliases), (&b, &b_aliases)]).unwrap();

    let (id, rest) = idx.longest_prefix_match("/foo/bar/v1/chat").unwrap();
    assert_eq!(id, &a);
    assert_eq!(rest, "v1/chat");

    let (id, rest) = idx.longest_prefix_match("/foo/v1/chat").unwrap();
    assert_eq!(id, &b);
    assert_eq!(rest, "v1/chat");
}

#[test]
fn longest_prefix_match_none_when_unmatched() {
    let idx = AliasIndex::default();
    assert!(idx.longest_prefix_match("/unknown/path").is_none());
}
