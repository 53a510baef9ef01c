//! Share grants: (pin | category, user) pairs with no identity of their own.
//!
//! Removing a grant is idempotent: a 404 from the unshare endpoints is
//! reported as [`ShareRemoval::NotShared`] rather than an error.

use serde_json::{Value, json};

use crate::api::{ApiClient, unwrap_envelope};
use crate::error::ClientError;
use crate::models::share::SharedItemsRecord;
use crate::models::{ShareRecipient, ShareRemoval, SharedItems};

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn shared_with_me(client: &ApiClient) -> Result<SharedItems, ClientError> {
    let body = client.get("/share").await?;
    let record: SharedItemsRecord = if body.is_null() { SharedItemsRecord::default() } else { serde_json::from_value(body)? };
    Ok(record.into())
}

/// Grant `to_user_id` access to pin `pin_id`. Returns the server's body.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn share_pin(client: &ApiClient, pin_id: &str, to_user_id: &str) -> Result<Value, ClientError> {
    client.post(&format!("/share/pin/{pin_id}"), &json!({ "toUserId": to_user_id })).await
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors other than 404.
pub async fn unshare_pin(client: &ApiClient, pin_id: &str, user_id: &str) -> Result<ShareRemoval, ClientError> {
    remove_grant(client, &format!("/share/pin/{pin_id}/{user_id}")).await
}

/// Users pin `pin_id` is shared with.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn pin_shares(client: &ApiClient, pin_id: &str) -> Result<Vec<ShareRecipient>, ClientError> {
    unwrap_envelope(client.get(&format!("/share/pin/{pin_id}")).await?, "shares")
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn share_category(client: &ApiClient, category_id: &str, to_user_id: &str) -> Result<Value, ClientError> {
    client.post(&format!("/share/category/{category_id}"), &json!({ "toUserId": to_user_id })).await
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors other than 404.
pub async fn unshare_category(
    client: &ApiClient,
    category_id: &str,
    user_id: &str,
) -> Result<ShareRemoval, ClientError> {
    remove_grant(client, &format!("/share/category/{category_id}/{user_id}")).await
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn category_shares(client: &ApiClient, category_id: &str) -> Result<Vec<ShareRecipient>, ClientError> {
    unwrap_envelope(client.get(&format!("/share/category/{category_id}")).await?, "shares")
}

async fn remove_grant(client: &ApiClient, endpoint: &str) -> Result<ShareRemoval, ClientError> {
    match client.delete(endpoint).await {
        Ok(_) => Ok(ShareRemoval::Removed),
        Err(e) if e.is_not_found() => {
            tracing::debug!(endpoint, "share grant already absent");
            Ok(ShareRemoval::NotShared)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "share_test.rs"]
mod tests;
