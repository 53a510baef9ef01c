//! Origin-scoped key-value persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store, saved-places list, badge counter, and install-prompt flag
//! all persist through one [`KeyValueStore`]. Keys share the `travelmaps:`
//! prefix so several apps can share one backing file without collisions.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const KEY_PREFIX: &str = "travelmaps:";

pub const ACCESS_TOKEN_KEY: &str = "travelmaps:token";
pub const REFRESH_TOKEN_KEY: &str = "travelmaps:refreshToken";
pub const CACHED_USER_KEY: &str = "travelmaps:user";
pub const SAVED_PLACES_KEY: &str = "travelmaps:saved";
pub const LAST_SEEN_VERSION_KEY: &str = "travelmaps:lastSeenVersion";
pub const INSTALL_DISMISSED_KEY: &str = "travelmaps:install-dismissed";

/// Errors produced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The write would grow the store past its byte quota.
    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encode failed: {0}")]
    Encode(String),
}

/// Durable string key-value storage.
///
/// Implementations serialize access internally; callers may share one store
/// across tasks behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] when the write does not fit;
    /// the previous state is left untouched.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Total bytes a set of entries occupies for quota accounting.
pub(crate) fn entries_size<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    entries.map(|(k, v)| k.len() + v.len()).sum()
}
