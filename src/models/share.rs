use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::deserialize_opt_id;
use super::category::Category;
use super::pin::{Pin, PinRecord};

/// Everything other users have shared with the current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedItems {
    pub shared_pins: Vec<Pin>,
    pub shared_categories: Vec<Category>,
}

/// `GET /share` body before pin translation. Either list may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SharedItemsRecord {
    #[serde(default)]
    pub shared_pins: Option<Vec<PinRecord>>,
    #[serde(default)]
    pub shared_categories: Option<Vec<Category>>,
}

impl From<SharedItemsRecord> for SharedItems {
    fn from(r: SharedItemsRecord) -> Self {
        Self {
            shared_pins: r.shared_pins.unwrap_or_default().into_iter().map(Pin::from).collect(),
            shared_categories: r.shared_categories.unwrap_or_default(),
        }
    }
}

/// A user a pin or category has been shared with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecipient {
    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of removing a share grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareRemoval {
    Removed,
    /// The grant did not exist; nothing changed.
    NotShared,
}
