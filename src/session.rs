use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Authenticated principal, mirroring the backend session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Process-wide observable session state.
///
/// Holds the current user (or none) and the admin flag. Written only by
/// [`AuthService`](crate::auth::AuthService); read from anywhere. Owned by
/// the composition root and passed by reference, never a hidden global.
#[derive(Debug)]
pub struct SessionStore {
    user_tx: watch::Sender<Option<User>>,
    admin_tx: watch::Sender<bool>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (user_tx, _) = watch::channel(None);
        let (admin_tx, _) = watch::channel(false);
        Self { user_tx, admin_tx }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    pub fn is_admin(&self) -> bool {
        *self.admin_tx.borrow()
    }

    /// Subscribe to user changes.
    pub fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Subscribe to admin-flag changes.
    pub fn watch_admin(&self) -> watch::Receiver<bool> {
        self.admin_tx.subscribe()
    }

    /// Publish a signed-in user. Any authenticated user is admin: the app
    /// has exactly one privilege tier, with no role check against the
    /// backend.
    pub(crate) fn set_authenticated(&self, user: User) {
        debug!(user_id = %user.id, "session store: authenticated");
        self.user_tx.send_replace(Some(user));
        self.admin_tx.send_replace(true);
    }

    /// Reset to signed-out state.
    pub(crate) fn clear(&self) {
        debug!("session store: cleared");
        self.user_tx.send_replace(None);
        self.admin_tx.send_replace(false);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    fn someone() -> User {
        User {
            id: "u-1".into(),
            email: "me@example.com".into(),
            name: "Me".into(),
        }
    }

    #[test]
    fn starts_signed_out() {
        let store = SessionStore::new();
        assert!(store.current_user().is_none());
        assert!(!store.is_admin());
    }

    #[tokio::test]
    async fn subscribers_see_auth_and_clear() {
        let store = SessionStore::new();
        let mut users = store.watch_user();
        let mut admin = store.watch_admin();

        store.set_authenticated(someone());
        users.changed().await.unwrap();
        admin.changed().await.unwrap();
        assert_eq!(users.borrow().as_ref().map(|u| u.id.clone()), Some("u-1".into()));
        assert!(*admin.borrow());

        store.clear();
        users.changed().await.unwrap();
        assert!(users.borrow().is_none());
        assert!(!*admin.borrow());
    }
}
