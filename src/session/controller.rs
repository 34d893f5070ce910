//! Session lifecycle state machine. One controller instance owns the current
//! identity; every other component receives read-only snapshots. No failure
//! crosses this boundary raw: every outcome collapses into one of the four
//! states, and `Error` is always retryable.

use parking_lot::RwLock;

use super::credentials::CredentialStore;
use super::identity::{Identity, Role};
use crate::config::Config;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Stored session not examined yet; guards must not redirect in this state.
    Initializing,
    Authenticated(Identity),
    Unauthenticated,
    /// Unexpected storage failure during init/refresh. Non-terminal.
    Error(String),
}

pub struct SessionController {
    store: CredentialStore,
    bootstrap_admin_email: String,
    state: RwLock<SessionState>,
}

impl SessionController {
    pub fn new(store: CredentialStore, bootstrap_admin_email: impl Into<String>) -> Self {
        Self {
            store,
            bootstrap_admin_email: bootstrap_admin_email.into(),
            state: RwLock::new(SessionState::Initializing),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(CredentialStore::new(&cfg.profile_dir), cfg.bootstrap_admin_email.clone())
    }

    pub fn store(&self) -> &CredentialStore { &self.store }

    /// Resolve the stored session once at application start.
    pub fn init(&self) {
        self.recompute("init");
    }

    /// Re-read the store and recompute state; called after any flow mutates
    /// the store directly so all observers converge on what is on disk.
    pub fn refresh(&self) {
        self.recompute("refresh");
    }

    fn recompute(&self, op: &str) {
        let next = match self.store.read() {
            Ok(Some((_token, identity))) => {
                tracing::debug!(target: "session", email = %identity.email, "session.{op} resolved authenticated");
                SessionState::Authenticated(identity)
            }
            Ok(None) => {
                tracing::debug!(target: "session", "session.{op} no stored session");
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::error!(target: "session", "session.{op} store failure: {e}");
                SessionState::Error(e.to_string())
            }
        };
        *self.state.write() = next;
    }

    /// Commit a token+identity pair obtained from a successful authentication
    /// call. The store write lands before the state transition; if the write
    /// fails the controller reports `Error` and stays logged out.
    pub fn login_commit(&self, token: &str, identity: Identity) {
        if let Err(e) = self.store.write(token, &identity) {
            tracing::error!(target: "session", "session.login_commit store write failed: {e}");
            *self.state.write() = SessionState::Error(e.to_string());
            return;
        }
        tracing::info!(target: "session", email = %identity.email, "session.login_commit");
        *self.state.write() = SessionState::Authenticated(identity);
    }

    /// End the session locally. The store is cleared first; a failed clear is
    /// logged but still ends the session, and repeated calls are harmless.
    /// Remote sign-out is the API layer's concern and never blocks this.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(target: "session", "session.logout store clear failed: {e}");
        }
        *self.state.write() = SessionState::Unauthenticated;
        tracing::info!(target: "session", "session.logout");
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read(), SessionState::Authenticated(_))
    }

    pub fn current_identity(&self) -> Option<Identity> {
        match &*self.state.read() {
            SessionState::Authenticated(id) => Some(id.clone()),
            _ => None,
        }
    }

    /// Admin if the role says so, or if the email matches the configured
    /// bootstrap admin address (legacy escape hatch, see config).
    pub fn is_admin(&self) -> bool {
        match &*self.state.read() {
            SessionState::Authenticated(id) => {
                id.role == Role::Admin || id.email.eq_ignore_ascii_case(&self.bootstrap_admin_email)
            }
            _ => false,
        }
    }

    pub fn display_name(&self) -> String {
        match &*self.state.read() {
            SessionState::Authenticated(id) => id.display_name(),
            _ => "User".to_string(),
        }
    }
}
