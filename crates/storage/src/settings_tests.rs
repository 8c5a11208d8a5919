use super::*;

#[test]
fn auth_not_required_always_passes() {
    let s = Settings::default();
    assert!(s.authorize(None));
    assert!(s.authorize(Some("anything")));
}

#[test]
fn auth_required_checks_key() {
    let s = Settings { require_api_key: true, api_key: "secret".to_string() };
    assert!(s.authorize(Some("secret")));
    assert!(!s.authorize(Some("wrong")));
    assert!(!s.authorize(None));
    assert!(!s.authorize(Some("")));
}
