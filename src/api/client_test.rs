use super::mock::{MockTransport, TEST_BASE_URL, reply, test_client};
use super::*;
use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY};
use serde_json::json;

fn signed_in(transport: &Arc<MockTransport>) -> (ApiClient, Arc<crate::storage::MemoryStore>) {
    let (client, backing) = test_client(transport.clone());
    client.tokens().set_tokens("old-access", Some("refresh-1")).unwrap();
    (client, backing)
}

// =============================================================================
// headers and dispatch
// =============================================================================

#[tokio::test]
async fn attaches_json_content_type_and_bearer_token() {
    let transport = Arc::new(MockTransport::new());
    transport.push(200, json!({ "pins": [] }));
    let (client, _) = signed_in(&transport);

    let body = client.get("/pins").await.unwrap();
    assert_eq!(body, json!({ "pins": [] }));

    let sent = transport.last_request();
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.url, format!("{TEST_BASE_URL}/pins"));
    assert_eq!(sent.header("content-type"), Some("application/json"));
    assert_eq!(sent.header("Authorization"), Some("Bearer old-access"));
}

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() {
    let transport = Arc::new(MockTransport::new());
    transport.push(200, json!([]));
    let (client, _) = test_client(transport.clone());

    client.get("/pins/public").await.unwrap();
    assert_eq!(transport.last_request().header("Authorization"), None);
}

#[tokio::test]
async fn caller_headers_take_precedence() {
    let transport = Arc::new(MockTransport::new());
    transport.push(200, json!({}));
    let (client, _) = signed_in(&transport);

    let options = RequestOptions::new(Method::POST)
        .header("Content-Type", "application/merge-patch+json")
        .header("Authorization", "Bearer explicit")
        .json(json!({ "a": 1 }));
    client.request("/things", options).await.unwrap();

    let sent = transport.last_request();
    assert_eq!(sent.header("content-type"), Some("application/merge-patch+json"));
    assert_eq!(sent.header("authorization"), Some("Bearer explicit"));
    assert_eq!(sent.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("authorization")).count(), 1);
    assert_eq!(sent.body, Some(json!({ "a": 1 })));
}

#[tokio::test]
async fn query_pairs_are_forwarded() {
    let transport = Arc::new(MockTransport::new());
    transport.push(200, json!([]));
    let (client, _) = test_client(transport.clone());

    client.get_with_query("/users/search", &[("q", "ana & bo".to_owned())]).await.unwrap();
    let sent = transport.last_request();
    assert_eq!(sent.url, format!("{TEST_BASE_URL}/users/search"));
    assert_eq!(sent.query, vec![("q".to_owned(), "ana & bo".to_owned())]);
}

// =============================================================================
// refresh protocol
// =============================================================================

#[tokio::test]
async fn refresh_then_single_retry_with_new_token() {
    let transport = Arc::new(MockTransport::new());
    transport
        .push(401, json!({ "error": "Token expired" }))
        .push(200, json!({ "accessToken": "new-access", "refreshToken": "refresh-2" }))
        .push(200, json!({ "pins": [{ "id": "p1" }] }));
    let (client, backing) = signed_in(&transport);

    let body = client.get("/pins").await.unwrap();
    assert_eq!(body, json!({ "pins": [{ "id": "p1" }] }));

    let sent = transport.requests();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].header("Authorization"), Some("Bearer old-access"));

    assert_eq!(sent[1].url, format!("{TEST_BASE_URL}/auth/refresh"));
    assert_eq!(sent[1].method, Method::POST);
    assert_eq!(sent[1].header("Authorization"), None);
    assert_eq!(sent[1].body, Some(json!({ "refreshToken": "refresh-1" })));

    assert_eq!(sent[2].url, format!("{TEST_BASE_URL}/pins"));
    assert_eq!(sent[2].header("Authorization"), Some("Bearer new-access"));

    assert_eq!(backing.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("new-access"));
    assert_eq!(backing.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn refresh_without_rotated_refresh_token_keeps_old_one() {
    let transport = Arc::new(MockTransport::new());
    transport
        .push(401, json!({}))
        .push(200, json!({ "accessToken": "new-access" }))
        .push(200, json!({ "ok": true }));
    let (client, backing) = signed_in(&transport);

    client.get("/auth/profile").await.unwrap();
    assert_eq!(backing.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn missing_refresh_token_expires_session_without_refresh_call() {
    let transport = Arc::new(MockTransport::new());
    transport.push(401, json!({ "error": "Unauthorized" }));
    let (client, backing) = test_client(transport.clone());
    client.tokens().set_tokens("old-access", None).unwrap();
    let mut events = client.subscribe();

    let err = client.get("/pins").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(transport.requests().len(), 1);
    assert!(backing.is_empty());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn rejected_refresh_clears_store_and_broadcasts() {
    let transport = Arc::new(MockTransport::new());
    transport
        .push(401, json!({}))
        .push(401, json!({ "error": "Invalid refresh token" }));
    let (client, backing) = signed_in(&transport);
    client.tokens().set_cached_user(&serde_json::from_value(json!({ "id": "u1" })).unwrap()).unwrap();
    let mut events = client.subscribe();

    let err = client.get("/categories").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(backing.is_empty());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn unreachable_refresh_endpoint_is_session_expired() {
    let transport = Arc::new(MockTransport::new());
    transport.push(401, json!({})).push_unreachable();
    let (client, backing) = signed_in(&transport);

    let err = client.get("/pins").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(backing.is_empty());
}

#[tokio::test]
async fn refresh_body_without_access_token_is_failure() {
    let transport = Arc::new(MockTransport::new());
    transport.push(401, json!({})).push(200, json!({ "ok": true }));
    let (client, _) = signed_in(&transport);

    let err = client.get("/pins").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

#[tokio::test]
async fn second_401_is_not_retried_again() {
    let transport = Arc::new(MockTransport::new());
    transport
        .push(401, json!({}))
        .push(200, json!({ "accessToken": "new-access" }))
        .push(401, json!({ "error": "Forbidden for this token" }));
    let (client, backing) = signed_in(&transport);

    let err = client.get("/pins").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, ref message } if message == "Forbidden for this token"));
    assert_eq!(transport.requests().len(), 3);
    assert_eq!(transport.count_path("/auth/refresh"), 1);
    // The session survives a retried 401.
    assert_eq!(backing.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("new-access"));
}

#[tokio::test]
async fn skip_refresh_returns_401_as_api_error() {
    let transport = Arc::new(MockTransport::new());
    transport.push(401, json!({ "error": "Invalid email or password" }));
    let (client, backing) = signed_in(&transport);

    let options = RequestOptions::new(Method::POST).json(json!({})).skip_refresh();
    let err = client.request("/auth/login", options).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(backing.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
}

#[tokio::test(flavor = "current_thread")]
async fn concurrent_401s_share_one_refresh() {
    let transport = Arc::new(MockTransport::with_handler(|req| {
        if req.url.ends_with("/auth/refresh") {
            return reply(200, json!({ "accessToken": "new-access", "refreshToken": "refresh-2" }));
        }
        match req.header("Authorization") {
            Some("Bearer new-access") => reply(200, json!({ "url": req.url })),
            _ => reply(401, json!({ "error": "expired" })),
        }
    }));
    let (client, _) = signed_in(&transport);

    let (pins, categories) = tokio::join!(client.get("/pins"), client.get("/categories"));
    assert_eq!(pins.unwrap()["url"], format!("{TEST_BASE_URL}/pins"));
    assert_eq!(categories.unwrap()["url"], format!("{TEST_BASE_URL}/categories"));
    assert_eq!(transport.count_path("/auth/refresh"), 1);
}

// =============================================================================
// error normalization
// =============================================================================

#[tokio::test]
async fn api_error_message_precedence() {
    let transport = Arc::new(MockTransport::new());
    transport
        .push(400, json!({ "error": "Title is required", "message": "ignored" }))
        .push(409, json!({ "message": "Already shared" }))
        .push(500, json!({ "detail": "boom" }))
        .push_raw(502, "<html>bad gateway</html>");
    let (client, _) = signed_in(&transport);

    let messages: Vec<(Option<u16>, String)> = {
        let mut out = Vec::new();
        for _ in 0..4 {
            let err = client.get("/pins").await.unwrap_err();
            out.push((err.status(), err.to_string()));
        }
        out
    };
    assert_eq!(
        messages,
        vec![
            (Some(400), "Title is required".to_owned()),
            (Some(409), "Already shared".to_owned()),
            (Some(500), "Request failed with status 500".to_owned()),
            (Some(502), "Request failed with status 502".to_owned()),
        ]
    );
}

#[tokio::test]
async fn unreachable_server_is_connectivity_error() {
    let transport = Arc::new(MockTransport::new());
    transport.push_unreachable();
    let (client, backing) = signed_in(&transport);

    let err = client.get("/pins").await.unwrap_err();
    assert!(matches!(err, ClientError::Connectivity(_)));
    assert!(err.to_string().starts_with("unable to connect to server"));
    assert_eq!(backing.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("old-access"));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let transport = Arc::new(MockTransport::new());
    transport.push_raw(204, "");
    let (client, _) = signed_in(&transport);
    assert_eq!(client.delete("/pins/p1").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn non_json_success_body_is_decode_error() {
    let transport = Arc::new(MockTransport::new());
    transport.push_raw(200, "ok");
    let (client, _) = signed_in(&transport);
    assert!(matches!(client.get("/pins").await.unwrap_err(), ClientError::Decode(_)));
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let (client, _) = test_client(Arc::new(MockTransport::new()));
    assert_eq!(client.base_url(), TEST_BASE_URL);
    let client = ApiClient::new(
        "http://x.test/api/v1/",
        Arc::new(MockTransport::new()),
        TokenStore::new(Arc::new(crate::storage::MemoryStore::new())),
    );
    assert_eq!(client.base_url(), "http://x.test/api/v1");
}
