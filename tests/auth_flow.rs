mod common;

use std::sync::Arc;

use common::memory_state;
use folio::session::SessionStore;
use folio::state::AppState;
use folio::{ApiError, Backend};

#[tokio::test]
async fn login_publishes_user_and_admin_flag() {
    let (state, backend) = memory_state();
    backend.seed_account("me@example.com", "hunter2-long", "Me");

    state.auth().login("me@example.com", "hunter2-long").await.unwrap();

    let user = state.session.current_user().expect("user published");
    assert_eq!(user.email, "me@example.com");
    assert_eq!(user.name, "Me");
    assert!(state.session.is_admin());
}

#[tokio::test]
async fn login_normalizes_email_case_and_whitespace() {
    let (state, backend) = memory_state();
    backend.seed_account("me@example.com", "hunter2-long", "Me");

    state
        .auth()
        .login("  ME@Example.COM ", "hunter2-long")
        .await
        .unwrap();
    assert!(state.session.current_user().is_some());
}

#[tokio::test]
async fn failed_login_returns_message_and_leaves_store_untouched() {
    let (state, backend) = memory_state();
    backend.seed_account("me@example.com", "hunter2-long", "Me");

    let err = state
        .auth()
        .login("me@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(!err.to_string().is_empty());
    assert!(state.session.current_user().is_none());
    assert!(!state.session.is_admin());

    // An already-authenticated store also survives a failed re-login.
    state.auth().login("me@example.com", "hunter2-long").await.unwrap();
    let _ = state
        .auth()
        .login("me@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(state.session.current_user().is_some());
    assert!(state.session.is_admin());
}

#[tokio::test]
async fn logout_clears_store_even_when_backend_is_down() {
    let (state, backend) = memory_state();
    backend.seed_account("me@example.com", "hunter2-long", "Me");
    state.auth().login("me@example.com", "hunter2-long").await.unwrap();

    backend.set_offline(true);
    state.auth().logout().await;

    assert!(state.session.current_user().is_none());
    assert!(!state.session.is_admin());
}

#[tokio::test]
async fn check_auth_resynchronizes_with_remote_session() {
    let (state, backend) = memory_state();
    backend.seed_account("me@example.com", "hunter2-long", "Me");
    state.auth().login("me@example.com", "hunter2-long").await.unwrap();

    // Fresh process, same remote session: a new store starts empty and
    // check_auth picks the session back up.
    let restarted = AppState::from_parts(
        state.config.clone(),
        backend.clone(),
        Arc::new(SessionStore::new()),
    );
    assert!(restarted.session.current_user().is_none());
    assert!(restarted.auth().check_auth().await);
    assert!(restarted.session.current_user().is_some());
    assert!(restarted.session.is_admin());

    // Remote session gone: check_auth clears and reports false.
    backend.delete_session().await.unwrap();
    assert!(!restarted.auth().check_auth().await);
    assert!(restarted.session.current_user().is_none());
    assert!(!restarted.session.is_admin());
}

#[tokio::test]
async fn register_logs_in_with_the_new_account() {
    let (state, _backend) = memory_state();

    state
        .auth()
        .register("new@example.com", "long-enough-pass", "Newcomer")
        .await
        .unwrap();

    let user = state.session.current_user().expect("registered and logged in");
    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.name, "Newcomer");
    assert!(state.session.is_admin());
}

#[tokio::test]
async fn register_short_circuits_when_account_creation_fails() {
    let (state, backend) = memory_state();
    backend.seed_account("taken@example.com", "whatever-pass", "Original");

    let err = state
        .auth()
        .register("taken@example.com", "long-enough-pass", "Copycat")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    // Login was never attempted.
    assert!(state.session.current_user().is_none());
}

#[tokio::test]
async fn register_surfaces_login_failure_after_creation_succeeded() {
    let (state, backend) = memory_state();
    backend.set_reject_sessions(true);

    let err = state
        .auth()
        .register("new@example.com", "long-enough-pass", "Newcomer")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(state.session.current_user().is_none());

    // The account does exist: the known inconsistency window.
    backend.set_reject_sessions(false);
    let dup = state
        .auth()
        .register("new@example.com", "long-enough-pass", "Newcomer")
        .await
        .unwrap_err();
    assert_eq!(dup.status(), Some(409));
}

#[tokio::test]
async fn register_validates_inputs_before_any_backend_call() {
    let (state, backend) = memory_state();
    backend.set_offline(true);

    // Rejected client-side, so the outage is never observed.
    let err = state
        .auth()
        .register("not-an-email", "long-enough-pass", "X")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));

    let err = state
        .auth()
        .register("ok@example.com", "short", "X")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));
}
