use markup_babel::formats::adf::{encode, extract_text};
use serde_json::{json, Value};

#[test]
fn test_trivial_inputs() {
    assert_eq!(extract_text(&Value::Null), None);
    assert_eq!(extract_text(&json!("x")), Some("x".to_string()));
    assert_eq!(extract_text(&json!({})), None);
}

#[test]
fn test_date_from_millis() {
    let node = json!({"type": "date", "attrs": {"timestamp": "1582152559000"}});
    assert_eq!(extract_text(&node), Some("2020-02-19".to_string()));
}

#[test]
fn test_out_of_range_date_is_returned_raw() {
    let node = json!({"type": "date", "attrs": {"timestamp": "99999999999999999999"}});
    assert_eq!(
        extract_text(&node),
        Some("99999999999999999999".to_string())
    );
}

#[test]
fn test_round_trip_keeps_words() {
    let source = "Hello **bold** and *italic* text";
    let text = extract_text(&encode(source).to_value()).expect("text");
    for word in ["Hello", "bold", "italic", "text"] {
        assert!(text.contains(word), "{word} missing from {text}");
    }
}

#[test]
fn test_inline_nodes() {
    let doc = json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [
                {"type": "mention", "attrs": {"text": "@Ada"}},
                {"type": "text", "text": " shipped "},
                {"type": "status", "attrs": {"text": "DONE"}},
                {"type": "emoji", "attrs": {"shortName": ":tada:"}}
            ]
        }]
    });
    let text = extract_text(&doc).expect("text");
    assert!(text.contains("@Ada"));
    assert!(text.contains("DONE"));
    assert!(text.contains(":tada:"));
}

#[test]
fn test_unknown_node_type_recurses() {
    let doc = json!({
        "type": "somethingNew",
        "content": [{"type": "text", "text": "inside"}]
    });
    assert_eq!(extract_text(&doc), Some("inside".to_string()));
}
