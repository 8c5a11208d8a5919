use super::*;

#[test]
fn error_body_serializes_flat() {
    let e = ErrorBody::new("model not found");
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["error"], "model not found");
}

#[test]
fn model_list_entry_omits_empty_aliases() {
    let entry = ModelListEntry::new(ModelId::new("m"), vec![]);
    let json = serde_json::to_value(&entry).unwrap();
    assert!(json.get("aliases").is_none());
}

#[test]
fn model_list_entry_includes_aliases_when_present() {
    let entry = ModelListEntry::new(ModelId::new("m"), vec!["chat".to_string()]);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["aliases"][0], "chat");
}

#[test]
fn sse_frame_wraps_data_and_blank_line() {
    let evt = Event::ConfigChanged { reloading: true };
    let frame = sse_frame(&evt).unwrap();
    assert!(frame.starts_with("data: "));
    assert!(frame.ends_with("\n\n"));
    assert!(frame.contains("\"config_changed\""));
}
