use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::client::Backend;
use crate::error::ApiError;
use crate::session::SessionStore;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Session-based auth flow against the hosted platform.
///
/// Every operation translates backend responses into the injected
/// [`SessionStore`]; nothing here panics or leaves the store half-updated.
/// Callers get structured results, never raised errors.
pub struct AuthService {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }

    /// Create a remote session and publish the account to the session
    /// store with `is_admin = true`. On any failure the store is left
    /// exactly as it was and the error carries a displayable message.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::Invalid("Invalid email".into()));
        }

        self.backend.create_session(&email, password).await.map_err(|e| {
            error!(error = %e, "login failed");
            e
        })?;
        let user = self.backend.get_account().await.map_err(|e| {
            error!(error = %e, "fetching account after login failed");
            e
        })?;

        info!(user_id = %user.id, "logged in");
        self.session.set_authenticated(user);
        Ok(())
    }

    /// Best-effort sign-out: the remote session delete may fail, but the
    /// local store is always cleared so the caller can navigate away.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.backend.delete_session().await {
            warn!(error = %e, "deleting remote session failed; clearing local state anyway");
        }
        self.session.clear();
    }

    /// Resynchronize the store with the actual remote session. Returns
    /// whether a valid session exists; on failure the store is cleared.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> bool {
        match self.backend.get_account().await {
            Ok(user) => {
                self.session.set_authenticated(user);
                true
            }
            Err(e) => {
                warn!(error = %e, "no valid session");
                self.session.clear();
                false
            }
        }
    }

    /// Create a new account, then log in with the same credentials.
    /// A failure during account creation short-circuits without
    /// attempting login.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(), ApiError> {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::Invalid("Invalid email".into()));
        }
        if password.len() < 8 {
            warn!("password too short");
            return Err(ApiError::Invalid("Password too short".into()));
        }

        self.backend
            .create_account(&email, password, name)
            .await
            .map_err(|e| {
                error!(error = %e, "registration failed");
                e
            })?;

        info!(email = %email, "account created");
        self.login(&email, password).await
    }
}

#[cfg(test)]
mod email_tests {
    use super::is_valid_email;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("me@example.com"));
        assert!(is_valid_email("first.last@sub.domain.io"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("no-tld@example"));
    }
}
