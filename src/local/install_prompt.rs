//! Decide whether to offer home-screen installation.
//!
//! ```text
//! evaluate ──dismissed/standalone──▶ Hidden
//!    │ ──iOS──▶ ShowIosInstructions (after 3s)
//!    └──other──▶ AwaitInstallEvent ──on_install_event──▶ ShowInstallButton (after 3s)
//!                                               install(Accepted) / dismiss ──▶ Hidden
//! ```
//!
//! Delays are returned to the host to schedule; nothing here sleeps.

#[cfg(test)]
#[path = "install_prompt_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use crate::storage::{INSTALL_DISMISSED_KEY, KeyValueStore, StorageError};

pub const PROMPT_DELAY: Duration = Duration::from_secs(3);

const IOS_MARKERS: [&str; 3] = ["iPad", "iPhone", "iPod"];

/// What the host knows about where it is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallEnv {
    pub user_agent: String,
    /// Already launched from the home screen.
    pub standalone: bool,
}

impl InstallEnv {
    #[must_use]
    pub fn is_ios(&self) -> bool {
        IOS_MARKERS.iter().any(|m| self.user_agent.contains(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Hidden,
    ShowIosInstructions { after: Duration },
    AwaitInstallEvent,
    ShowInstallButton { after: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

pub struct InstallPrompt {
    store: Arc<dyn KeyValueStore>,
    action: PromptAction,
    /// Set while the host holds an unused install event.
    deferred: bool,
}

impl InstallPrompt {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, action: PromptAction::Hidden, deferred: false }
    }

    #[must_use]
    pub fn action(&self) -> PromptAction {
        self.action
    }

    /// Any stored value counts as dismissed.
    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        match self.store.get(INSTALL_DISMISSED_KEY) {
            Ok(value) => value.is_some_and(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read install dismissal");
                false
            }
        }
    }

    pub fn evaluate(&mut self, env: &InstallEnv) -> PromptAction {
        self.action = if self.is_dismissed() || env.standalone {
            PromptAction::Hidden
        } else if env.is_ios() {
            PromptAction::ShowIosInstructions { after: PROMPT_DELAY }
        } else {
            PromptAction::AwaitInstallEvent
        };
        self.action
    }

    /// The platform offered an install event. Ignored unless one was awaited.
    pub fn on_install_event(&mut self) -> PromptAction {
        if self.action == PromptAction::AwaitInstallEvent {
            self.deferred = true;
            self.action = PromptAction::ShowInstallButton { after: PROMPT_DELAY };
        }
        self.action
    }

    /// Report the user's answer to the native install dialog. The held
    /// event is consumed whatever the answer.
    pub fn install(&mut self, outcome: InstallOutcome) -> PromptAction {
        if !self.deferred {
            return self.action;
        }
        self.deferred = false;
        if outcome == InstallOutcome::Accepted {
            self.action = PromptAction::Hidden;
        }
        self.action
    }

    /// Hide the prompt for good.
    ///
    /// # Errors
    ///
    /// Returns an error if the dismissal cannot be persisted; the prompt is
    /// hidden for this session regardless.
    pub fn dismiss(&mut self) -> Result<(), StorageError> {
        self.action = PromptAction::Hidden;
        self.deferred = false;
        self.store.set(INSTALL_DISMISSED_KEY, "true")
    }
}
