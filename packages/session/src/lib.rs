#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Operator session store and login throttle.
//!
//! Centralizes what the browser front end kept in local storage — the auth
//! token, the failed-login counter, and the lockout timestamp — behind
//! explicit `get`/`set`/`clear` operations with an init-on-load contract, so
//! callers depend on this interface rather than ambient storage.
//!
//! The throttle is a UX deterrent, not a security boundary: it lives
//! entirely on the operator's machine, is trivially bypassed by deleting the
//! store file, and is deliberately not server-enforced.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Failed attempts allowed before the lockout engages.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// How long a lockout lasts.
pub const LOCKOUT_HOURS: i64 = 24;

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing the store file failed.
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file contents could not be parsed.
    #[error("Session store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What the caller should tell the operator after a failed login.
///
/// The ladder matches the deployed behavior exactly: two quiet failures, a
/// two-chances warning, a last-chance warning, then the lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureWarning {
    /// Attempts 1-2: show the backend's message or a generic one.
    Generic,
    /// Attempt 3.
    TwoChancesLeft,
    /// Attempt 4.
    LastChance,
    /// Attempt 5+: locked out for the next 24 hours.
    Blocked,
}

impl FailureWarning {
    /// The operator-facing message for this warning.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Generic => "Invalid credentials!",
            Self::TwoChancesLeft => {
                "Warning: Last 2 chances left before account is blocked for 24 hours."
            }
            Self::LastChance => "Warning: Last chance left before account is blocked for 24 hours.",
            Self::Blocked => "Too many failed attempts. Login is blocked for 24 hours.",
        }
    }
}

/// The persisted state. Field names match the storage keys the front end
/// used (`token`, `agencyLoginAttempts`, `agencyLoginBlockedUntil`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(rename = "agencyLoginAttempts", default)]
    agency_login_attempts: u32,
    #[serde(
        rename = "agencyLoginBlockedUntil",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    agency_login_blocked_until: Option<DateTime<Utc>>,
}

/// File-backed session store.
///
/// Loaded once on construction; every mutation persists immediately, so a
/// crash between actions never loses throttle state.
pub struct SessionStore {
    path: PathBuf,
    state: SessionState,
}

impl SessionStore {
    /// Default store path, relative to the operator's working directory.
    pub const DEFAULT_PATH: &'static str = ".billion-eye-session.json";

    /// Loads the store from the path in `SESSION_STORE_PATH`, falling back
    /// to [`Self::DEFAULT_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if an existing store file cannot be read or
    /// parsed.
    pub fn load_from_env() -> Result<Self, SessionError> {
        let path = std::env::var("SESSION_STORE_PATH")
            .unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        Self::load(Path::new(&path))
    }

    /// Loads the store, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if an existing store file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let state = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            SessionState::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    fn persist(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }

    // ── Token ────────────────────────────────────────────────────────

    /// The stored auth token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    /// Stores the auth token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be persisted.
    pub fn set_token(&mut self, token: &str) -> Result<(), SessionError> {
        self.state.token = Some(token.to_string());
        self.persist()
    }

    /// Clears the auth token (logout).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be persisted.
    pub fn clear_token(&mut self) -> Result<(), SessionError> {
        self.state.token = None;
        self.persist()
    }

    // ── Login throttle ───────────────────────────────────────────────

    /// Checks whether login submission is currently blocked.
    ///
    /// Called on init and again on every submit, so a lockout written by
    /// another process is honored too. Returns the remaining lockout expiry
    /// when blocked.
    #[must_use]
    pub fn blocked_until(&self) -> Option<DateTime<Utc>> {
        self.state
            .agency_login_blocked_until
            .filter(|until| Utc::now() < *until)
    }

    /// Records a failed login and returns the warning to show.
    ///
    /// The fifth consecutive failure sets a lockout expiring
    /// [`LOCKOUT_HOURS`] from now.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be persisted.
    pub fn record_failure(&mut self) -> Result<FailureWarning, SessionError> {
        self.state.agency_login_attempts += 1;
        let attempts = self.state.agency_login_attempts;

        let warning = if attempts >= MAX_LOGIN_ATTEMPTS {
            self.state.agency_login_blocked_until =
                Some(Utc::now() + Duration::hours(LOCKOUT_HOURS));
            FailureWarning::Blocked
        } else if attempts == 4 {
            FailureWarning::LastChance
        } else if attempts == 3 {
            FailureWarning::TwoChancesLeft
        } else {
            FailureWarning::Generic
        };

        self.persist()?;
        Ok(warning)
    }

    /// Records a successful login: clears the attempt counter and lockout,
    /// and stores the new token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the store cannot be persisted.
    pub fn record_success(&mut self, token: &str) -> Result<(), SessionError> {
        self.state.agency_login_attempts = 0;
        self.state.agency_login_blocked_until = None;
        self.state.token = Some(token.to_string());
        self.persist()
    }

    /// Current failed-attempt count.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.state.agency_login_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir().join(format!("billion-eye-session-{name}.json"));
        let _ = std::fs::remove_file(&path);
        SessionStore::load(&path).unwrap()
    }

    #[test]
    fn warning_ladder_matches_policy() {
        let mut store = temp_store("ladder");
        assert_eq!(store.record_failure().unwrap(), FailureWarning::Generic);
        assert_eq!(store.record_failure().unwrap(), FailureWarning::Generic);
        assert_eq!(
            store.record_failure().unwrap(),
            FailureWarning::TwoChancesLeft
        );
        assert_eq!(store.record_failure().unwrap(), FailureWarning::LastChance);
        assert_eq!(store.record_failure().unwrap(), FailureWarning::Blocked);
        assert!(store.blocked_until().is_some());
    }

    #[test]
    fn fifth_failure_blocks_for_twenty_four_hours() {
        let mut store = temp_store("lockout");
        for _ in 0..5 {
            store.record_failure().unwrap();
        }
        let until = store.blocked_until().unwrap();
        let remaining = until - Utc::now();
        assert!(remaining <= Duration::hours(LOCKOUT_HOURS));
        assert!(remaining > Duration::hours(LOCKOUT_HOURS - 1));

        // Still blocked even if the next submission carries correct
        // credentials — the gate fires before any network call.
        assert!(store.blocked_until().is_some());
    }

    #[test]
    fn success_before_fifth_failure_resets_the_counter() {
        let mut store = temp_store("reset");
        for _ in 0..4 {
            store.record_failure().unwrap();
        }
        store.record_success("token-1").unwrap();
        assert_eq!(store.attempts(), 0);
        assert!(store.blocked_until().is_none());
        assert_eq!(store.token(), Some("token-1"));
    }

    #[test]
    fn state_survives_reload() {
        let path = std::env::temp_dir().join("billion-eye-session-reload.json");
        let _ = std::fs::remove_file(&path);

        let mut store = SessionStore::load(&path).unwrap();
        store.record_failure().unwrap();
        store.record_failure().unwrap();
        store.set_token("token-2").unwrap();
        drop(store);

        let store = SessionStore::load(&path).unwrap();
        assert_eq!(store.attempts(), 2);
        assert_eq!(store.token(), Some("token-2"));
    }

    #[test]
    fn clear_token_keeps_throttle_state() {
        let mut store = temp_store("clear");
        store.record_failure().unwrap();
        store.set_token("token-3").unwrap();
        store.clear_token().unwrap();
        assert_eq!(store.token(), None);
        assert_eq!(store.attempts(), 1);
    }
}
