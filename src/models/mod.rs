//! Wire DTOs for the TravelMaps REST API.
//!
//! DESIGN
//! ======
//! Backend payloads use camelCase. Pins exist in two shapes: [`PinRecord`]
//! mirrors the backend schema and [`Pin`] is what the view layer consumes.
//! Conversion between the two happens only through the `From` impls in
//! [`pin`], so field names cannot drift between call sites.
//!
//! Identifiers are kept as strings; numeric IDs from the server are accepted
//! and stringified on decode. Coordinates, flags and names decode leniently:
//! one loosely typed record must not fail a whole list.

pub mod category;
pub mod pin;
pub mod share;
pub mod user;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use category::{Category, CategoryDraft, CategoryPatch};
pub use pin::{CreatePinPayload, Pin, PinDraft, PinRecord, UpdatePinPayload};
pub use share::{ShareRecipient, ShareRemoval, SharedItems};
pub use user::{ProfileUpdate, User};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Int(n) => n.to_string(),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// Number or numeric string. Anything else, including `null`, is `None`.
pub(crate) fn deserialize_opt_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Like [`deserialize_opt_coord`] for a coordinate that must be present.
pub(crate) fn deserialize_coord<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_opt_coord(deserializer)?.ok_or_else(|| D::Error::custom("expected a number or numeric string"))
}

/// `true`/`false` or `"true"`/`"false"`; `null` and anything else is `false`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Text as given, numbers stringified, `null` as empty.
pub(crate) fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
