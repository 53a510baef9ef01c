//! Session artifacts: access token, refresh token, cached user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only code that touches the token keys. The API client reads the
//! access token per request and overwrites both tokens after a refresh; the
//! session manager writes the cached user. No expiry is tracked here; an
//! expired token shows up as a 401.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod tests;

use std::sync::Arc;

use crate::models::User;
use crate::storage::{ACCESS_TOKEN_KEY, CACHED_USER_KEY, KeyValueStore, REFRESH_TOKEN_KEY, StorageError};

#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Backing store, shared with the other local helpers.
    #[must_use]
    pub fn backing(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Stored access token. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Write the access token, and the refresh token when one is supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), StorageError> {
        self.store.set(ACCESS_TOKEN_KEY, access)?;
        if let Some(refresh) = refresh {
            self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Cached profile. A cached value that no longer parses is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn cached_user(&self) -> Result<Option<User>, StorageError> {
        let Some(raw) = self.store.get(CACHED_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "cached user unreadable, ignoring");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the user cannot be encoded or written.
    pub fn set_cached_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.store.set(CACHED_USER_KEY, &raw)
    }

    /// Remove all three session slots.
    ///
    /// # Errors
    ///
    /// Returns the first removal failure; later slots are still attempted.
    pub fn clear(&self) -> Result<(), StorageError> {
        let results = [
            self.store.remove(ACCESS_TOKEN_KEY),
            self.store.remove(REFRESH_TOKEN_KEY),
            self.store.remove(CACHED_USER_KEY),
        ];
        results.into_iter().collect()
    }

    /// Whether an access token is stored. Read failures count as signed out.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }
}
