//! Process-wide session state for the view layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views hold a [`SessionManager`] handle (clones share state) instead of
//! reaching for a global. It restores the cached user at construction,
//! validates it against the server once via [`SessionManager::initialize`],
//! and follows forced logouts from the API client through
//! [`SessionManager::spawn_expiry_watcher`].
//!
//! ERROR HANDLING
//! ==============
//! `login`/`register` record a display message in [`SessionState::error`]
//! and still return the error, so callers awaiting them can react too.
//! A failed startup validation is treated as a logout, not an error.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, SessionEvent};
use crate::error::ClientError;
use crate::models::User;
use crate::services::auth::{self, AuthSession};
use crate::validation::{Credentials, CredentialsForm, validate_credentials};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True until startup validation has finished.
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionManager {
    client: ApiClient,
    state: Arc<RwLock<SessionState>>,
    initialized: Arc<AtomicBool>,
}

impl SessionManager {
    /// Seed state from the cached user; `loading` stays set until
    /// [`SessionManager::initialize`] runs.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let user = client.tokens().cached_user().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cached user unavailable");
            None
        });
        let state = SessionState { user, loading: true, error: None };
        Self { client, state: Arc::new(RwLock::new(state)), initialized: Arc::new(AtomicBool::new(false)) }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate a stored session against the server. Only the first call
    /// does anything.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.client.tokens().is_authenticated() {
            match auth::profile(&self.client).await {
                Ok(user) => {
                    if let Err(e) = self.client.tokens().set_cached_user(&user) {
                        tracing::warn!(error = %e, "failed to cache profile");
                    }
                    self.write().user = Some(user);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session could not be restored");
                    self.logout();
                }
            }
        }
        self.write().loading = false;
    }

    /// # Errors
    ///
    /// Returns the login failure after recording its message in state.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        self.write().error = None;
        let result = auth::login(&self.client, email, password).await;
        self.apply(result)
    }

    /// # Errors
    ///
    /// Returns the registration failure after recording its message in state.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthSession, ClientError> {
        self.write().error = None;
        let result = auth::register(&self.client, email, password, name).await;
        self.apply(result)
    }

    /// Validate a login/register form, then dispatch it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without contacting the server when
    /// the form is incomplete; otherwise as [`SessionManager::login`].
    pub async fn submit(&self, form: &CredentialsForm) -> Result<AuthSession, ClientError> {
        match validate_credentials(form)? {
            Credentials::SignIn { email, password } => self.login(&email, &password).await,
            Credentials::Register { email, password, name } => self.register(&email, &password, &name).await,
        }
    }

    /// Clear stored credentials and local state. The server is not contacted.
    pub fn logout(&self) {
        if let Err(e) = auth::logout(&self.client) {
            tracing::error!(error = %e, "failed to clear stored session");
        }
        self.write().user = None;
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Clear `user` whenever the API client reports an expired session.
    /// An event that arrives after a new login stored fresh tokens is
    /// ignored. The task ends once every client handle is dropped.
    #[must_use]
    pub fn spawn_expiry_watcher(&self) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let state = Arc::clone(&self.state);
        let tokens = self.client.tokens().clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Expired) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
                if tokens.is_authenticated() {
                    tracing::debug!("stale session expiry ignored, new session stored");
                    continue;
                }
                state.write().unwrap_or_else(PoisonError::into_inner).user = None;
                tracing::info!("session expired, signed out");
            }
        })
    }

    fn apply(&self, result: Result<AuthSession, ClientError>) -> Result<AuthSession, ClientError> {
        let mut state = self.write();
        match result {
            Ok(session) => {
                state.user = Some(session.user.clone());
                Ok(session)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
