use super::*;

#[test]
fn policy_prefers_swap_over_parallel() {
    let g = GroupConfig::builder().swap(true).parallel(true).build();
    assert_eq!(g.policy(), GroupPolicy::Swap);
}

#[test]
fn policy_defaults_to_plain() {
    let g = GroupConfig::builder().build();
    assert_eq!(g.policy(), GroupPolicy::Plain);
}

#[test]
fn policy_parallel() {
    let g = GroupConfig::builder().parallel(true).build();
    assert_eq!(g.policy(), GroupPolicy::Parallel);
}

#[test]
fn group_id_borrows_as_str() {
    use std::collections::HashMap;
    let mut map: HashMap<GroupId, u32> = HashMap::new();
    map.insert(GroupId::new("g1"), 1);
    assert_eq!(map.get("g1"), Some(&1));
}
