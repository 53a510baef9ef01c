//! Pin shapes and the translation between them.
//!
//! Backend: `title`, `latitude`, `longitude`. Frontend: `name`, `lat`, `lng`.
//! Loose frontend input ([`PinDraft`]) may carry any alias; it resolves with a
//! fixed precedence:
//!
//! | backend field | aliases, highest precedence first |
//! |---------------|-----------------------------------|
//! | `title`       | `name`, `title`                   |
//! | `latitude`    | `lat`, `latitude`                 |
//! | `longitude`   | `lon`, `lng`, `longitude`         |
//! | `address`     | `address`, `formatted`            |
//!
//! A present alias wins even when it is zero or empty.

#[cfg(test)]
#[path = "pin_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_flag, deserialize_id, deserialize_opt_coord, deserialize_opt_id};

// =============================================================================
// BACKEND SHAPE
// =============================================================================

/// A pin exactly as the backend schema names it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_coord", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_coord", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Embedded category object, when the server joins it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_public: bool,
    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<String>,
}

// =============================================================================
// FRONTEND SHAPE
// =============================================================================

/// A pin as the view layer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<Value>,
    pub is_public: bool,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub shared_by: Option<Value>,
    pub shared_at: Option<String>,
}

impl Pin {
    /// Legacy alias for [`Pin::name`].
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Legacy alias for [`Pin::lat`].
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.lat
    }

    /// Legacy alias for [`Pin::lng`].
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.lng
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared_by.is_some()
    }
}

impl From<PinRecord> for Pin {
    fn from(r: PinRecord) -> Self {
        Self {
            id: r.id,
            name: r.title,
            description: r.description,
            lat: r.latitude,
            lng: r.longitude,
            address: r.address,
            notes: r.notes,
            image_url: r.image_url,
            category_id: r.category_id,
            category: r.category,
            is_public: r.is_public,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            shared_by: r.shared_by,
            shared_at: r.shared_at,
        }
    }
}

impl From<&Pin> for PinRecord {
    fn from(p: &Pin) -> Self {
        Self {
            id: p.id.clone(),
            title: p.name.clone(),
            description: p.description.clone(),
            latitude: p.lat,
            longitude: p.lng,
            address: p.address.clone(),
            notes: p.notes.clone(),
            image_url: p.image_url.clone(),
            category_id: p.category_id.clone(),
            category: p.category.clone(),
            is_public: p.is_public,
            user_id: p.user_id.clone(),
            created_at: p.created_at.clone(),
            updated_at: p.updated_at.clone(),
            shared_by: p.shared_by.clone(),
            shared_at: p.shared_at.clone(),
        }
    }
}

// =============================================================================
// LOOSE INPUT
// =============================================================================

/// Pin fields as a form or a legacy saved place supplies them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl PinDraft {
    #[must_use]
    pub fn resolved_title(&self) -> Option<&str> {
        self.name.as_deref().or(self.title.as_deref())
    }

    #[must_use]
    pub fn resolved_latitude(&self) -> Option<f64> {
        self.lat.or(self.latitude)
    }

    #[must_use]
    pub fn resolved_longitude(&self) -> Option<f64> {
        self.lon.or(self.lng).or(self.longitude)
    }

    #[must_use]
    pub fn resolved_address(&self) -> Option<&str> {
        self.address.as_deref().or(self.formatted.as_deref())
    }

    /// Body for `POST /pins`, with server-side defaults filled in.
    #[must_use]
    pub fn create_payload(&self) -> CreatePinPayload {
        CreatePinPayload {
            title: self.resolved_title().map(ToOwned::to_owned),
            description: self.description.clone().unwrap_or_default(),
            latitude: self.resolved_latitude(),
            longitude: self.resolved_longitude(),
            address: self.resolved_address().unwrap_or_default().to_owned(),
            notes: self.notes.clone().unwrap_or_default(),
            image_url: self.image_url.clone(),
            category_id: self.category_id.clone(),
            is_public: self.is_public.unwrap_or(false),
        }
    }

    /// Body for `PUT /pins/{id}` carrying only the fields that were supplied.
    #[must_use]
    pub fn update_payload(&self) -> UpdatePinPayload {
        UpdatePinPayload {
            title: self.resolved_title().map(ToOwned::to_owned),
            description: self.description.clone(),
            latitude: self.resolved_latitude(),
            longitude: self.resolved_longitude(),
            address: self.resolved_address().map(ToOwned::to_owned),
            notes: self.notes.clone(),
            image_url: self.image_url.clone(),
            category_id: self.category_id.clone(),
            is_public: self.is_public,
        }
    }
}

impl From<&Pin> for PinDraft {
    fn from(p: &Pin) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            lat: p.lat,
            lng: p.lng,
            address: p.address.clone(),
            notes: p.notes.clone(),
            image_url: p.image_url.clone(),
            category_id: p.category_id.clone(),
            is_public: Some(p.is_public),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub address: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl UpdatePinPayload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
