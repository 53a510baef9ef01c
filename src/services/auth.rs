//! Credential endpoints and profile lookup.
//!
//! Login and register bypass the refresh protocol: a 401 from these
//! endpoints means bad credentials, not an expired session.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::api::{ApiClient, RequestOptions, unwrap_envelope};
use crate::error::ClientError;
use crate::models::User;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const PROFILE_ENDPOINT: &str = "/auth/profile";

/// Tokens and profile returned by login/register.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Authenticate and persist the returned session.
///
/// # Errors
///
/// Returns the server's rejection as [`ClientError::Api`], or a storage
/// error if the tokens cannot be saved.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<AuthSession, ClientError> {
    let body = json!({ "email": email, "password": password });
    let session = authenticate(client, LOGIN_ENDPOINT, body).await?;
    tracing::info!(user_id = %session.user.id, "logged in");
    Ok(session)
}

/// Create an account and persist the returned session.
///
/// # Errors
///
/// See [`login`].
pub async fn register(
    client: &ApiClient,
    email: &str,
    password: &str,
    name: &str,
) -> Result<AuthSession, ClientError> {
    let body = json!({ "email": email, "password": password, "name": name });
    let session = authenticate(client, REGISTER_ENDPOINT, body).await?;
    tracing::info!(user_id = %session.user.id, "registered");
    Ok(session)
}

/// Current user's profile from the server.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn profile(client: &ApiClient) -> Result<User, ClientError> {
    let body = client.get(PROFILE_ENDPOINT).await?;
    unwrap_envelope(body, "user")
}

/// Forget the local session. The server is not contacted.
///
/// # Errors
///
/// Returns a storage error if the session slots cannot be removed.
pub fn logout(client: &ApiClient) -> Result<(), ClientError> {
    client.tokens().clear()?;
    tracing::info!("logged out");
    Ok(())
}

async fn authenticate(
    client: &ApiClient,
    endpoint: &str,
    body: serde_json::Value,
) -> Result<AuthSession, ClientError> {
    let options = RequestOptions::new(Method::POST).json(body).skip_refresh();
    let value = client.request(endpoint, options).await?;
    let session: AuthSession = serde_json::from_value(value)?;

    let tokens = client.tokens();
    tokens.set_tokens(&session.access_token, session.refresh_token.as_deref())?;
    tokens.set_cached_user(&session.user)?;
    Ok(session)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
