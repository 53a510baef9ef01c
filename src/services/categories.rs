//! Category CRUD.

use crate::api::{ApiClient, unwrap_envelope};
use crate::error::ClientError;
use crate::models::{Category, CategoryDraft, CategoryPatch};

/// Categories owned by the current user.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn list(client: &ApiClient) -> Result<Vec<Category>, ClientError> {
    unwrap_envelope(client.get("/categories").await?, "categories")
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn create(client: &ApiClient, draft: &CategoryDraft) -> Result<Category, ClientError> {
    unwrap_envelope(client.post("/categories", draft).await?, "category")
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn update(client: &ApiClient, id: &str, patch: &CategoryPatch) -> Result<Category, ClientError> {
    unwrap_envelope(client.put(&format!("/categories/{id}"), patch).await?, "category")
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ClientError> {
    client.delete(&format!("/categories/{id}")).await?;
    Ok(())
}

/// Categories any user has made public.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn list_public(client: &ApiClient) -> Result<Vec<Category>, ClientError> {
    unwrap_envelope(client.get("/categories/public").await?, "categories")
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
