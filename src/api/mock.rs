//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use super::ApiClient;
use crate::storage::MemoryStore;
use crate::token_store::TokenStore;

pub(crate) const TEST_BASE_URL: &str = "http://api.test/api/v1";

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Replays queued responses in order, or answers through a handler.
/// Every request is recorded. Each send yields once so concurrent callers
/// interleave on a single-threaded runtime.
#[derive(Default)]
pub(crate) struct MockTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self { handler: Some(Box::new(handler)), ..Self::default() }
    }

    pub(crate) fn push(&self, status: u16, body: Value) -> &Self {
        self.push_raw(status, &body.to_string())
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) -> &Self {
        self.queue.lock().unwrap().push_back(Ok(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub(crate) fn push_unreachable(&self) -> &Self {
        self.queue.lock().unwrap().push_back(Err(TransportError("connection refused".into())));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }

    pub(crate) fn count_path(&self, suffix: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|r| r.url.ends_with(suffix)).count()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;
        if let Some(handler) = &self.handler {
            return handler(&request);
        }
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".into())))
    }
}

/// Response helper for handlers.
pub(crate) fn reply(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: body.to_string() })
}

/// Client over `transport` with a fresh in-memory token store.
pub(crate) fn test_client(transport: Arc<MockTransport>) -> (ApiClient, Arc<MemoryStore>) {
    let backing = Arc::new(MemoryStore::new());
    let client = ApiClient::new(TEST_BASE_URL, transport, TokenStore::new(backing.clone()));
    (client, backing)
}
