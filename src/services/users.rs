//! User discovery and profile edits.

use crate::api::{ApiClient, unwrap_envelope};
use crate::error::ClientError;
use crate::models::{ProfileUpdate, User};

pub const DEFAULT_USER_LIST_LIMIT: u32 = 50;

/// Search users by username or display name.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn search(client: &ApiClient, query: &str) -> Result<Vec<User>, ClientError> {
    let body = client.get_with_query("/users/search", &[("q", query.to_owned())]).await?;
    unwrap_envelope(body, "users")
}

/// Browse users, `limit` defaulting to [`DEFAULT_USER_LIST_LIMIT`].
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn list(client: &ApiClient, limit: Option<u32>) -> Result<Vec<User>, ClientError> {
    let limit = limit.unwrap_or(DEFAULT_USER_LIST_LIMIT);
    let body = client.get_with_query("/users", &[("limit", limit.to_string())]).await?;
    unwrap_envelope(body, "users")
}

/// Public profile of another user.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn get(client: &ApiClient, user_id: &str) -> Result<User, ClientError> {
    unwrap_envelope(client.get(&format!("/users/{user_id}")).await?, "user")
}

/// Update the current user's profile. The cached user is refreshed on success.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors, or a storage error if the
/// cached profile cannot be rewritten.
pub async fn update_profile(client: &ApiClient, update: &ProfileUpdate) -> Result<User, ClientError> {
    let user: User = unwrap_envelope(client.put("/users/me", update).await?, "user")?;
    client.tokens().set_cached_user(&user)?;
    Ok(user)
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
