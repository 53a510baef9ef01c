//! Pin CRUD. Every payload crosses the field-name boundary here: drafts go
//! out through [`PinDraft`]'s payload builders and records come back through
//! `Pin::from`.

use crate::api::{ApiClient, unwrap_envelope};
use crate::error::ClientError;
use crate::models::{Pin, PinDraft, PinRecord, SharedItems};

fn into_pins(records: Vec<PinRecord>) -> Vec<Pin> {
    records.into_iter().map(Pin::from).collect()
}

/// Pins owned by the current user.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn list(client: &ApiClient) -> Result<Vec<Pin>, ClientError> {
    let records: Vec<PinRecord> = unwrap_envelope(client.get("/pins").await?, "pins")?;
    Ok(into_pins(records))
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn create(client: &ApiClient, draft: &PinDraft) -> Result<Pin, ClientError> {
    let payload = draft.create_payload();
    let record: PinRecord = unwrap_envelope(client.post("/pins", &payload).await?, "pin")?;
    tracing::debug!(pin_id = %record.id, "pin created");
    Ok(record.into())
}

/// Apply the fields present in `draft` to pin `id`.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn update(client: &ApiClient, id: &str, draft: &PinDraft) -> Result<Pin, ClientError> {
    let payload = draft.update_payload();
    let record: PinRecord = unwrap_envelope(client.put(&format!("/pins/{id}"), &payload).await?, "pin")?;
    Ok(record.into())
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ClientError> {
    client.delete(&format!("/pins/{id}")).await?;
    Ok(())
}

/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn list_public(client: &ApiClient) -> Result<Vec<Pin>, ClientError> {
    let records: Vec<PinRecord> = unwrap_envelope(client.get("/pins/public").await?, "pins")?;
    Ok(into_pins(records))
}

/// Pins and categories shared with the current user.
///
/// # Errors
///
/// Propagates [`ApiClient::request`] errors.
pub async fn shared_items(client: &ApiClient) -> Result<SharedItems, ClientError> {
    super::share::shared_with_me(client).await
}

#[cfg(test)]
#[path = "pins_test.rs"]
mod tests;
