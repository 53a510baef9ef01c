//! TravelMaps client library.
//!
//! DESIGN
//! ======
//! Every HTTP call goes through [`api::ApiClient`], which owns bearer-token
//! attachment and the refresh-and-retry protocol. Domain services in
//! [`services`] translate between frontend and backend shapes and delegate to
//! the client. Session artifacts live behind [`token_store::TokenStore`],
//! which sits on a namespaced [`storage::KeyValueStore`].
//!
//! The [`local`] module carries the storage-only helpers used by the view
//! layer: the legacy saved-places list, the update badge counter, and the
//! install-prompt decision.

pub mod api;
pub mod config;
pub mod error;
pub mod local;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod token_store;
pub mod validation;

pub use api::{ApiClient, SessionEvent};
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{SessionManager, SessionState};
pub use token_store::TokenStore;
