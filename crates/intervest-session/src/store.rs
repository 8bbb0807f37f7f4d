//! The session store: sole owner and writer of [`SessionState`].
//!
//! The store is responsible for:
//! - Signing users in (authenticate → issue token → publish)
//! - Signing users out
//! - Refreshing the token inside the sliding window
//! - Answering "is anyone authenticated right now?"
//! - Broadcasting every new state to subscribers
//!
//! # Concurrency note
//!
//! Mutating calls (`login`, `logout`, `refresh_token`) are serialized by
//! an async mutex held for the whole call, so two logins can't interleave
//! and the last one to finish is the one observed. The state itself lives
//! in a `tokio::sync::watch` channel and is swapped in one `send_replace`,
//! so readers see either the old state or the new one, never a mix.
//!
//! A dropped (cancelled) `login` future either never got the mutex or
//! never reached the publish step. Either way nothing is applied.

use intervest_token::Token;
use tokio::sync::{Mutex, watch};

use crate::{
    Authenticator, Clock, LocalAuthenticator, LoginRequest, SessionConfig,
    SessionError, SessionPhase, SessionSeed, SessionState, SessionUser,
    SystemClock, TokenPolicy,
};

/// Holds the current user and token and mediates every change to them.
///
/// Share it as `Arc<SessionStore>`; all methods take `&self`.
///
/// ## Lifecycle
///
/// ```text
///            login()                  (time passes)
/// [Anonymous] ─────→ [Active] ───────────────────→ [Expired]
///      ↑                │  ↑                           │
///      │   logout()     │  └──── refresh_token() ──────┤
///      └────────────────┘                              │
///      └───────────────────── logout() ────────────────┘
/// ```
pub struct SessionStore<A = LocalAuthenticator, K = SystemClock> {
    /// Current state. `send_replace` is the only write path.
    state: watch::Sender<SessionState>,

    /// Serializes mutating calls.
    write: Mutex<()>,

    policy: TokenPolicy,
    authenticator: A,
    clock: K,
}

impl SessionStore {
    /// Creates an anonymous store using the system clock and
    /// [`LocalAuthenticator`].
    pub fn new(config: SessionConfig) -> Self {
        Self::builder(config).build()
    }

    /// Starts a builder for a store with a custom seed, clock, or
    /// authenticator.
    pub fn builder(config: SessionConfig) -> SessionStoreBuilder {
        SessionStoreBuilder::new(config)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<A: Authenticator, K: Clock> SessionStore<A, K> {
    // -- Reads -----------------------------------------------------------

    /// A copy of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<Token> {
        self.state.borrow().token().cloned()
    }

    /// User and token present, token unexpired at the clock's `now`.
    ///
    /// Computed on every call; there's no cached flag to go stale.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(self.clock.now_secs())
    }

    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.state.borrow().is_authenticated_at(now)
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase_at(self.clock.now_secs())
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            token_ttl_secs: self.policy.ttl_secs(),
            refresh_window_secs: self.policy.refresh_window_secs(),
        }
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Returns a receiver that sees every state the store publishes.
    ///
    /// The receiver starts out with the current state marked as seen;
    /// `changed().await` resolves on the next mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // -- Mutations -------------------------------------------------------

    /// Signs a user in and replaces the whole session.
    ///
    /// # Errors
    /// - [`SessionError::EmptyEmail`]: no email; state unchanged
    /// - [`SessionError::AuthFailed`]: authenticator said no; state unchanged
    /// - [`SessionError::Token`]: token couldn't be issued; state unchanged
    pub async fn login(&self, request: LoginRequest) -> Result<SessionUser, SessionError> {
        let _write = self.write.lock().await;

        let user = match self.authenticator.authenticate(&request).await {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(error = %e, "login rejected");
                return Err(e);
            }
        };
        let now = self.clock.now_secs();
        let token = self.policy.issue_for(&user, now)?;

        self.state
            .send_replace(SessionState::signed_in(user.clone(), token));
        tracing::info!(
            user_id = %user.id,
            expires_at = now.saturating_add_unsigned(self.policy.ttl_secs()),
            "session started"
        );
        Ok(user)
    }

    /// Signs out. Always succeeds, even when nobody is signed in.
    pub async fn logout(&self) {
        let _write = self.write.lock().await;

        let previous = self.state.send_replace(SessionState::anonymous());
        match previous.user() {
            Some(user) => tracing::info!(user_id = %user.id, "session ended"),
            None => tracing::debug!("logout with no active session"),
        }
    }

    /// Re-issues the token if it's inside the refresh window.
    ///
    /// Returns `Ok(None)` when there's no token to refresh, otherwise the
    /// token now in effect (new or unchanged). On refresh the user is
    /// re-derived from the new token's claims.
    ///
    /// # Errors
    /// Returns [`SessionError::Token`] if the new token couldn't be
    /// issued; the current session is left as it was.
    pub async fn refresh_token(&self) -> Result<Option<Token>, SessionError> {
        let _write = self.write.lock().await;

        let Some(current) = self.token() else {
            tracing::debug!("refresh skipped, no session");
            return Ok(None);
        };

        let now = self.clock.now_secs();
        let outcome = self.policy.maybe_refresh(&current, now)?;

        match (outcome.refreshed, outcome.claims) {
            (true, Some(claims)) => {
                let user = SessionUser::from_claims(&claims);
                self.state
                    .send_replace(SessionState::signed_in(user, outcome.token.clone()));
                tracing::info!(
                    user_id = %claims.subject,
                    expires_at = claims.expires_at,
                    "session token refreshed"
                );
            }
            (_, claims) => {
                tracing::debug!(
                    remaining_secs = claims.map(|c| c.remaining_secs(now)),
                    "session token not due for refresh"
                );
            }
        }

        Ok(Some(outcome.token))
    }
}

// ---------------------------------------------------------------------------
// SessionStoreBuilder
// ---------------------------------------------------------------------------

/// Builder for [`SessionStore`].
///
/// # Example
///
/// ```rust
/// use intervest_session::{ManualClock, SessionConfig, SessionStore};
///
/// let clock = ManualClock::new(1000);
/// let store = SessionStore::builder(SessionConfig::default())
///     .clock(clock.clone())
///     .build();
/// assert!(!store.is_authenticated());
/// ```
pub struct SessionStoreBuilder<A = LocalAuthenticator, K = SystemClock> {
    config: SessionConfig,
    seed: SessionSeed,
    authenticator: A,
    clock: K,
}

impl SessionStoreBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            seed: SessionSeed::default(),
            authenticator: LocalAuthenticator,
            clock: SystemClock,
        }
    }
}

impl<A: Authenticator, K: Clock> SessionStoreBuilder<A, K> {
    /// Resumes from a previously stored user and/or token.
    pub fn seed(mut self, seed: SessionSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn clock<K2: Clock>(self, clock: K2) -> SessionStoreBuilder<A, K2> {
        SessionStoreBuilder {
            config: self.config,
            seed: self.seed,
            authenticator: self.authenticator,
            clock,
        }
    }

    pub fn authenticator<A2: Authenticator>(self, authenticator: A2) -> SessionStoreBuilder<A2, K> {
        SessionStoreBuilder {
            config: self.config,
            seed: self.seed,
            authenticator,
            clock: self.clock,
        }
    }

    pub fn build(self) -> SessionStore<A, K> {
        let config = self.config.validated();
        let (state, _) = watch::channel(SessionState::from_seed(self.seed));
        SessionStore {
            state,
            write: Mutex::new(()),
            policy: TokenPolicy::from_config(&config),
            authenticator: self.authenticator,
            clock: self.clock,
        }
    }
}
