//! Domain services over the API client.
//!
//! ARCHITECTURE
//! ============
//! One module per resource. Each operation maps to exactly one endpoint,
//! translates pin field names at the boundary, and unwraps the optional
//! response envelope. Errors from [`ApiClient`](crate::api::ApiClient) pass
//! through unchanged; there is no caching or extra retry here.

pub mod auth;
pub mod categories;
pub mod pins;
pub mod share;
pub mod users;
