//! App badge counting releases the user has not opened yet.
//!
//! The badge shows `CURRENT_VERSION - last seen version`. Opening or
//! focusing the app clears it and records the current version as seen.

#[cfg(test)]
#[path = "badge_test.rs"]
mod tests;

use std::sync::Arc;

use super::Visibility;
use crate::storage::{KeyValueStore, LAST_SEEN_VERSION_KEY};

/// Bump when shipping something users should notice.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
#[error("app badge unavailable: {0}")]
pub struct BadgeError(pub String);

/// Host badge capability.
pub trait AppBadge: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the host rejects the update.
    fn set(&self, count: u32) -> Result<(), BadgeError>;

    /// # Errors
    ///
    /// Returns an error when the host rejects the update.
    fn clear(&self) -> Result<(), BadgeError>;
}

pub struct BadgeTracker {
    store: Arc<dyn KeyValueStore>,
    badge: Option<Arc<dyn AppBadge>>,
}

impl BadgeTracker {
    /// `badge` is `None` on hosts without badge support.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, badge: Option<Arc<dyn AppBadge>>) -> Self {
        Self { store, badge }
    }

    /// Last version the user has seen; missing or unreadable counts as 0.
    #[must_use]
    pub fn last_seen(&self) -> u32 {
        match self.store.get(LAST_SEEN_VERSION_KEY) {
            Ok(raw) => raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last seen version");
                0
            }
        }
    }

    #[must_use]
    pub fn unseen_updates(&self) -> u32 {
        CURRENT_VERSION.saturating_sub(self.last_seen())
    }

    /// Show the unseen count, if there is one and the host has a badge.
    pub fn check_and_set(&self) {
        let Some(badge) = &self.badge else {
            tracing::debug!("app badge not supported");
            return;
        };
        let unseen = self.unseen_updates();
        if unseen == 0 {
            return;
        }
        match badge.set(unseen) {
            Ok(()) => tracing::info!(unseen, "badge set"),
            Err(e) => tracing::error!(error = %e, "failed to set badge"),
        }
    }

    /// Clear the badge and mark the current version as seen. When the host
    /// rejects the clear, the version is left unrecorded.
    pub fn clear(&self) {
        if let Some(badge) = &self.badge {
            if let Err(e) = badge.clear() {
                tracing::error!(error = %e, "failed to clear badge");
                return;
            }
        }
        if let Err(e) = self.store.set(LAST_SEEN_VERSION_KEY, &CURRENT_VERSION.to_string()) {
            tracing::error!(error = %e, "failed to record seen version");
            return;
        }
        tracing::debug!(version = CURRENT_VERSION, "version marked as seen");
    }

    pub fn on_visibility(&self, visibility: Visibility) {
        if visibility == Visibility::Visible {
            self.clear();
        }
    }

    /// Startup hook: the app is on screen, so clear right away.
    pub fn init(&self) {
        self.clear();
    }
}
