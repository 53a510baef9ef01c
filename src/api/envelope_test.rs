use super::*;
use serde_json::json;

#[test]
fn nested_payload_is_unwrapped() {
    let names: Vec<String> = unwrap_envelope(json!({ "pins": ["a", "b"], "total": 2 }), "pins").unwrap();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn bare_payload_is_used_directly() {
    let names: Vec<String> = unwrap_envelope(json!(["a"]), "pins").unwrap();
    assert_eq!(names, vec!["a"]);
}

#[test]
fn null_member_falls_back_to_whole_body() {
    #[derive(serde::Deserialize)]
    struct Body {
        id: String,
    }
    let body: Body = unwrap_envelope(json!({ "user": null, "id": "u1" }), "user").unwrap();
    assert_eq!(body.id, "u1");
}

#[test]
fn mismatched_shape_is_decode_error() {
    let err = unwrap_envelope::<Vec<String>>(json!({ "pins": 5 }), "pins").unwrap_err();
    assert!(matches!(err, ClientError::Decode(ref m) if m.starts_with("pins:")));
}
