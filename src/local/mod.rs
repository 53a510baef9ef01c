//! Storage-only helpers for the view layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! None of these touch the network. Each one reads and writes a single key
//! of the shared [`KeyValueStore`](crate::storage::KeyValueStore):
//!
//! - [`places`]: the legacy saved-places list with attached memories.
//! - [`badge`]: the "new version" app badge counter.
//! - [`install_prompt`]: whether to offer home-screen installation.
//!
//! Platform capabilities (alerts, the app badge) are injected as traits so
//! a terminal, a test, or a webview can each supply their own.

pub mod badge;
pub mod install_prompt;
pub mod places;

pub use badge::{AppBadge, BadgeError, BadgeTracker, CURRENT_VERSION};
pub use install_prompt::{InstallEnv, InstallOutcome, InstallPrompt, PromptAction};
pub use places::{Memory, PlaceChange, SavedPlace, SavedPlaces};

/// User-visible notification for failures the caller cannot recover from.
pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);
}

/// Alerts that only reach the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl Alerts for LogAlerts {
    fn alert(&self, message: &str) {
        tracing::warn!(message, "alert");
    }
}

/// Foreground state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}
