//! Login-scoped session context.
//!
//! A [`SessionContext`] exists only between a successful login and the
//! matching logout. The [`SessionStore`] is shared with the API client,
//! which attaches the session token to every request while one is active.
//! Issuing tokens is the backend's job; this module only holds them.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

/// Credentials and role of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Bearer token returned by the login endpoint.
    pub token: String,
    /// Role reported at login (e.g. `"admin"`, `"analyst"`).
    pub role: Option<String>,
    /// When the session was established.
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    /// Creates a session that starts now.
    #[must_use]
    pub fn new(token: impl Into<String>, role: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
            started_at: Utc::now(),
        }
    }

    /// Value of the `Authorization` header for this session.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Holder of the current session, if any.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<SessionContext>>,
}

impl SessionStore {
    /// Creates a store with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `session` after a successful login, replacing any previous
    /// session.
    pub fn login(&self, session: SessionContext) {
        log::debug!("Session started (role={:?})", session.role);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Clears the session. Returns the session that was active, if any.
    pub fn logout(&self) -> Option<SessionContext> {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            log::debug!("Session ended");
        }
        previous
    }

    /// Returns a copy of the active session.
    #[must_use]
    pub fn current(&self) -> Option<SessionContext> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
