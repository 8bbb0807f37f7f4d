//! Integration tests for the guard wired to a live session store.

use intervest::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

fn store_at(now: i64) -> (SessionStore<LocalAuthenticator, ManualClock>, ManualClock) {
    let clock = ManualClock::new(now);
    let store = SessionStore::builder(SessionConfig::default())
        .clock(clock.clone())
        .build();
    (store, clock)
}

// =========================================================================
// Guard over the session lifecycle
// =========================================================================

#[tokio::test]
async fn test_guard_follows_login_expiry_refresh_logout() {
    let (store, clock) = store_at(1000);
    let guard = AccessGuard::default();

    // Anonymous → redirect, carrying the requested path.
    let decision = guard.check_session(&store, "settings", "/settings");
    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: DEFAULT_REDIRECT.into(),
            from: "/settings".into(),
        }
    );

    // Active → render.
    store
        .login(LoginRequest::new("ada.lovelace@example.com"))
        .await
        .unwrap();
    assert_eq!(
        guard.check_session(&store, "settings", "/settings"),
        GuardDecision::Render("settings")
    );

    // Expired → redirect, with the user still on record.
    clock.set(1900);
    assert!(!guard.check_session(&store, "settings", "/settings").is_render());
    assert!(store.user().is_some());

    // Refresh → render again.
    store.refresh_token().await.unwrap();
    assert!(guard.check_session(&store, "settings", "/settings").is_render());

    // Logout → redirect.
    store.logout().await;
    assert!(!guard.check_session(&store, "settings", "/settings").is_render());
}

#[tokio::test]
async fn test_failed_login_converts_to_validation_error() {
    let (store, _) = store_at(1000);

    let err: IntervestError = store
        .login(LoginRequest::new(""))
        .await
        .unwrap_err()
        .into();

    assert!(err.is_validation());
    assert!(
        !AccessGuard::default()
            .check_session(&store, (), "/reports")
            .is_render()
    );
}

#[test]
fn test_guard_with_garbage_seed_redirects() {
    let store = SessionStore::builder(SessionConfig::default())
        .seed(SessionSeed {
            initial_user: None,
            initial_token: Some(Token::from("definitely.not.valid")),
        })
        .build();

    let decision = AccessGuard::redirecting_to("/signin").check_session(&store, (), "/analytics");

    assert_eq!(decision.redirect_target(), Some("/signin"));
    assert_eq!(decision.return_to(), Some("/analytics"));
}
