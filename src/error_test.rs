use super::*;

#[test]
fn api_error_displays_server_message() {
    let err = ClientError::Api { status: 400, message: "Title is required".into() };
    assert_eq!(err.to_string(), "Title is required");
    assert_eq!(err.status(), Some(400));
    assert!(!err.is_not_found());
}

#[test]
fn connectivity_and_session_expired_have_no_status() {
    assert_eq!(ClientError::Connectivity("refused".into()).status(), None);
    assert_eq!(ClientError::SessionExpired.status(), None);
    assert_eq!(ClientError::SessionExpired.to_string(), "session expired, please log in again");
}

#[test]
fn not_found_detected_from_status() {
    let err = ClientError::Api { status: 404, message: "Share not found".into() };
    assert!(err.is_not_found());
}

#[test]
fn json_error_maps_to_decode() {
    let err: ClientError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
    assert!(matches!(err, ClientError::Decode(_)));
}
