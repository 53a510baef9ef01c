//! Saved places with attached memories, persisted as one JSON array.

#[cfg(test)]
#[path = "places_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Alerts;
use crate::models::{deserialize_coord, deserialize_opt_id};
use crate::storage::{KeyValueStore, SAVED_PLACES_KEY, StorageError};

pub const QUOTA_ALERT: &str =
    "Storage is full! Try deleting some old images or notes. Images take up a lot of space.";

pub const LOCKED_ALERT: &str = "Saved places could not be read, so they were not overwritten.";

const DEFAULT_TITLE: &str = "Place";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stored ID as a string; a missing or `null` ID gets a fresh one.
fn deserialize_id_or_new<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_opt_id(deserializer)?.unwrap_or_else(new_id))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    #[serde(default = "new_id", deserialize_with = "deserialize_id_or_new")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Inline image as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Epoch milliseconds for memories created here. Older entries may hold
    /// any JSON value and are kept as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Memory {
    #[must_use]
    pub fn new(note: Option<String>, image: Option<String>) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|d| u64::try_from(d.as_millis()).ok())
            .map(Value::from);
        Self { id: new_id(), note, image, created_at, extra: Map::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    #[serde(default = "new_id", deserialize_with = "deserialize_id_or_new")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Geocoder's formatted address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(deserialize_with = "deserialize_coord")]
    pub lat: f64,
    #[serde(deserialize_with = "deserialize_coord")]
    pub lon: f64,
    #[serde(default)]
    pub memories: Vec<Memory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedPlace {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            id: new_id(),
            name: None,
            formatted: None,
            lat,
            lon,
            memories: Vec::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        non_empty(self.name.as_deref()).or(non_empty(self.formatted.as_deref())).unwrap_or(DEFAULT_TITLE)
    }

    /// `"<address or coordinates> • <n> memories"`.
    #[must_use]
    pub fn subtitle(&self) -> String {
        let location = match non_empty(self.formatted.as_deref()) {
            Some(formatted) => formatted.to_owned(),
            None => format!("{:.4}, {:.4}", self.lat, self.lon),
        };
        format!("{location} • {} memories", self.memories.len())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Result of changing one stored place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceChange {
    Saved,
    /// Applied in memory; the write failed and was alerted.
    Unsaved,
    NoSuchPlace,
}

/// In-memory list mirrored to storage after every change.
///
/// Entries that do not decode are kept aside and written back unchanged.
/// If the stored value cannot be read at all, saving is refused until
/// [`SavedPlaces::unlock`] is called, so a bad load never wipes the list.
pub struct SavedPlaces {
    store: Arc<dyn KeyValueStore>,
    alerts: Arc<dyn Alerts>,
    places: Vec<SavedPlace>,
    unreadable: Vec<Value>,
    locked: bool,
}

impl SavedPlaces {
    pub fn load(store: Arc<dyn KeyValueStore>, alerts: Arc<dyn Alerts>) -> Self {
        let mut saved = Self { store, alerts, places: Vec::new(), unreadable: Vec::new(), locked: false };
        let raw = match saved.store.get(SAVED_PLACES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return saved,
            Err(e) => {
                tracing::error!(error = %e, "failed to load saved places");
                saved.locked = true;
                return saved;
            }
        };
        let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "saved places unreadable, leaving them as stored");
                saved.locked = true;
                return saved;
            }
        };
        for entry in entries {
            match SavedPlace::deserialize(&entry) {
                Ok(place) => saved.places.push(place),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable saved place");
                    saved.unreadable.push(entry);
                }
            }
        }
        saved
    }

    #[must_use]
    pub fn places(&self) -> &[SavedPlace] {
        &self.places
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SavedPlace> {
        self.places.iter().find(|p| p.id == id)
    }

    /// Stored entries that did not decode.
    #[must_use]
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    /// True when the stored list could not be read and saving is refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Allow saves to replace a stored list that could not be read.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Append `place` and persist. Returns whether the write succeeded.
    pub fn add(&mut self, place: SavedPlace) -> bool {
        self.places.push(place);
        self.save()
    }

    /// Drop the place and its memories.
    pub fn remove(&mut self, id: &str) -> PlaceChange {
        let before = self.places.len();
        self.places.retain(|p| p.id != id);
        if self.places.len() == before {
            return PlaceChange::NoSuchPlace;
        }
        self.persist()
    }

    pub fn add_memory(&mut self, place_id: &str, memory: Memory) -> PlaceChange {
        let Some(place) = self.places.iter_mut().find(|p| p.id == place_id) else {
            return PlaceChange::NoSuchPlace;
        };
        place.memories.push(memory);
        self.persist()
    }

    /// Persist the list. Failures are logged and alerted; the in-memory
    /// list keeps the attempted state either way.
    pub fn save(&self) -> bool {
        if self.locked {
            tracing::warn!("saved places locked after failed load, not writing");
            self.alerts.alert(LOCKED_ALERT);
            return false;
        }
        match self.try_save() {
            Ok(()) => {
                tracing::debug!(count = self.places.len(), "saved places written");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save places");
                match e {
                    StorageError::QuotaExceeded { .. } => self.alerts.alert(QUOTA_ALERT),
                    other => self.alerts.alert(&format!("Could not save places: {other}")),
                }
                false
            }
        }
    }

    fn persist(&self) -> PlaceChange {
        if self.save() { PlaceChange::Saved } else { PlaceChange::Unsaved }
    }

    fn try_save(&self) -> Result<(), StorageError> {
        let encode = |e: serde_json::Error| StorageError::Encode(e.to_string());
        let mut entries =
            self.places.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>().map_err(encode)?;
        entries.extend(self.unreadable.iter().cloned());
        let raw = serde_json::to_string(&entries).map_err(encode)?;
        self.store.set(SAVED_PLACES_KEY, &raw)
    }
}
