//! Authenticated API client: the single choke point for HTTP calls.
//!
//! DESIGN
//! ======
//! Each call resolves `base + endpoint`, merges a JSON content type and the
//! stored bearer token under any caller headers, and sends through the
//! [`HttpTransport`]. A 401 on the first attempt runs the refresh protocol:
//!
//! ```text
//! Idle --401--> Refreshing --2xx + accessToken--> Refreshed --> retry once
//!   |                \--non-2xx / unreachable----> Failed
//!   \--no refresh token-------------------------> Failed
//! ```
//!
//! `Failed` clears the token store, broadcasts [`SessionEvent::Expired`], and
//! returns [`ClientError::SessionExpired`]. New tokens are persisted before
//! the retry is dispatched, so the retry always carries them.
//!
//! CONCURRENCY
//! ===========
//! Refreshes are serialized behind one async mutex. A task that waited on it
//! compares the stored access token with the one its request was rejected
//! with; if they differ, another task already rotated the session and this
//! one retries without refreshing again.

pub mod envelope;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token_store::TokenStore;

pub use envelope::unwrap_envelope;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
const SESSION_EVENT_CAPACITY: usize = 16;

/// Session lifecycle signals broadcast to interested components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Refresh failed or was impossible; stored credentials were cleared.
    Expired,
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Skip the refresh protocol: a 401 is returned as an API error and the
    /// session is left alone. Used by the credential endpoints, where 401
    /// means "wrong password" rather than "token expired".
    pub skip_refresh: bool,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, body: None, headers: Vec::new(), query: Vec::new(), skip_refresh: false }
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn skip_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshOutcome {
    Refreshed,
    /// Another task rotated the token while this one waited.
    AlreadyRotated,
    Failed(&'static str),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

struct Inner {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    events: broadcast::Sender<SessionEvent>,
    refresh_lock: Mutex<()>,
}

/// Cloneable handle; clones share the transport, token store, and refresh guard.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>, tokens: TokenStore) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { inner: Arc::new(Inner { base_url, transport, tokens, events, refresh_lock: Mutex::new(()) }) }
    }

    /// Build a client over the `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, tokens: TokenStore) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::new(config.api_base_url.clone(), Arc::new(transport), tokens))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Receive [`SessionEvent`]s emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Issue a request, refreshing and retrying once on a 401.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connectivity`] if the server could not be reached.
    /// - [`ClientError::SessionExpired`] if a 401 could not be recovered.
    /// - [`ClientError::Api`] for any other non-2xx response, including a
    ///   401 on the retried attempt.
    /// - [`ClientError::Decode`] if a 2xx body is not JSON.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ClientError> {
        let mut retried = false;
        loop {
            let token = self.inner.tokens.access_token()?;
            let request = self.build_request(endpoint, &options, token.as_deref());
            tracing::debug!(method = %options.method, endpoint, retried, "dispatching request");

            let response = self.inner.transport.send(request).await.map_err(|e| {
                tracing::warn!(endpoint, error = %e, "server unreachable");
                ClientError::Connectivity(e.to_string())
            })?;

            if response.status == 401 && !retried && !options.skip_refresh {
                retried = true;
                match self.recover_session(token.as_deref()).await {
                    RefreshOutcome::Refreshed | RefreshOutcome::AlreadyRotated => continue,
                    RefreshOutcome::Failed(reason) => {
                        tracing::warn!(endpoint, reason, "token refresh failed");
                        return Err(self.expire_session());
                    }
                }
            }

            return parse_response(endpoint, response);
        }
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, endpoint: &str) -> Result<Value, ClientError> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_with_query(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        let options = query
            .iter()
            .fold(RequestOptions::new(Method::GET), |opts, (k, v)| opts.query(*k, v.clone()));
        self.request(endpoint, options).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ClientError::Decode`] if `body`
    /// cannot be serialized.
    pub async fn post(&self, endpoint: &str, body: &impl Serialize) -> Result<Value, ClientError> {
        self.request(endpoint, RequestOptions::new(Method::POST).json(serde_json::to_value(body)?)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn put(&self, endpoint: &str, body: &impl Serialize) -> Result<Value, ClientError> {
        self.request(endpoint, RequestOptions::new(Method::PUT).json(serde_json::to_value(body)?)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn patch(&self, endpoint: &str, body: &impl Serialize) -> Result<Value, ClientError> {
        self.request(endpoint, RequestOptions::new(Method::PATCH).json(serde_json::to_value(body)?)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, endpoint: &str) -> Result<Value, ClientError> {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }

    fn build_request(&self, endpoint: &str, options: &RequestOptions, token: Option<&str>) -> HttpRequest {
        let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
        for (name, value) in &options.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        if let Some(token) = token {
            if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("authorization")) {
                headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
            }
        }
        HttpRequest {
            method: options.method.clone(),
            url: self.url(endpoint),
            headers,
            query: options.query.clone(),
            body: options.body.clone(),
        }
    }

    async fn recover_session(&self, rejected: Option<&str>) -> RefreshOutcome {
        let _guard = self.inner.refresh_lock.lock().await;
        if let Ok(Some(current)) = self.inner.tokens.access_token() {
            if rejected != Some(current.as_str()) {
                return RefreshOutcome::AlreadyRotated;
            }
        }
        self.refresh().await
    }

    async fn refresh(&self) -> RefreshOutcome {
        let refresh_token = match self.inner.tokens.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => return RefreshOutcome::Failed("no refresh token"),
            Err(e) => {
                tracing::warn!(error = %e, "refresh token unreadable");
                return RefreshOutcome::Failed("refresh token unreadable");
            }
        };

        let body = match serde_json::to_value(RefreshRequest { refresh_token: &refresh_token }) {
            Ok(body) => body,
            Err(_) => return RefreshOutcome::Failed("refresh body encode failed"),
        };
        let request = HttpRequest {
            method: Method::POST,
            url: self.url(REFRESH_ENDPOINT),
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            query: Vec::new(),
            body: Some(body),
        };

        let response = match self.inner.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "refresh endpoint unreachable");
                return RefreshOutcome::Failed("refresh endpoint unreachable");
            }
        };
        if !response.is_success() {
            tracing::debug!(status = response.status, "refresh rejected");
            return RefreshOutcome::Failed("refresh rejected");
        }
        let Ok(tokens) = serde_json::from_str::<RefreshResponse>(&response.body) else {
            return RefreshOutcome::Failed("refresh response missing accessToken");
        };

        match self.inner.tokens.set_tokens(&tokens.access_token, tokens.refresh_token.as_deref()) {
            Ok(()) => {
                tracing::info!(rotated_refresh = tokens.refresh_token.is_some(), "access token refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist refreshed tokens");
                RefreshOutcome::Failed("refreshed tokens not persisted")
            }
        }
    }

    fn expire_session(&self) -> ClientError {
        if let Err(e) = self.inner.tokens.clear() {
            tracing::error!(error = %e, "failed to clear session storage");
        }
        // No receivers is fine: nobody is listening for logout.
        let _ = self.inner.events.send(SessionEvent::Expired);
        ClientError::SessionExpired
    }
}

fn parse_response(endpoint: &str, response: HttpResponse) -> Result<Value, ClientError> {
    let parsed = if response.body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(&response.body)
    };

    if !response.is_success() {
        let status = response.status;
        let message = parsed
            .ok()
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        tracing::debug!(endpoint, status, %message, "request rejected");
        return Err(ClientError::Api { status, message });
    }

    parsed.map_err(|e| ClientError::Decode(format!("{endpoint}: {e}")))
}

/// Server-supplied failure text: `error`, then `message`.
fn server_message(body: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    })
}
