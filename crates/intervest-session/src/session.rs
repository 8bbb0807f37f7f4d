//! Session types: configuration, identity, and the state the store owns.
//!
//! A "session" is the client's record of who is signed in. It tracks:
//! - WHO the user is ([`SessionUser`])
//! - WHICH token vouches for them ([`Token`])
//! - WHETHER that token still holds, derived on demand ([`SessionPhase`])

use std::fmt;

use intervest_token::{Claims, Token};
use serde::{Deserialize, Serialize};

use crate::policy;

/// Name used when neither the login form nor the token supplies one.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Token lifetime settings.
///
/// Deserializable with every field optional, so a JSON config only needs
/// to name what it overrides:
///
/// ```rust
/// use intervest_session::SessionConfig;
///
/// let config: SessionConfig =
///     serde_json::from_str(r#"{ "token_ttl_secs": 300 }"#).unwrap();
/// assert_eq!(config.token_ttl_secs, 300);
/// assert_eq!(config.refresh_window_secs, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a freshly issued token, in seconds.
    ///
    /// Default: 900 (15 minutes).
    pub token_ttl_secs: u64,

    /// How long before expiry a refresh starts re-issuing, in seconds.
    ///
    /// Default: 60.
    pub refresh_window_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 15 * 60,
            refresh_window_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn with_ttl(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    pub fn with_refresh_window(mut self, secs: u64) -> Self {
        self.refresh_window_secs = secs;
        self
    }

    /// Clamps the refresh window below the ttl.
    ///
    /// A window as wide as the ttl would make every fresh token eligible
    /// for refresh immediately, and a refresh would no longer move the
    /// expiry forward. Called by the store builder.
    pub fn validated(mut self) -> Self {
        if self.token_ttl_secs > 0 && self.refresh_window_secs >= self.token_ttl_secs {
            let clamped = self.token_ttl_secs - 1;
            tracing::warn!(
                window = self.refresh_window_secs,
                ttl = self.token_ttl_secs,
                clamped,
                "refresh window must be shorter than token ttl, clamping"
            );
            self.refresh_window_secs = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// SessionSeed
// ---------------------------------------------------------------------------

/// Optional starting point for a store, e.g. a session persisted by a
/// previous run.
///
/// If only `initial_token` is given, the user is derived from its claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSeed {
    pub initial_user: Option<SessionUser>,
    pub initial_token: Option<Token>,
}

// ---------------------------------------------------------------------------
// SessionUser
// ---------------------------------------------------------------------------

/// The identity side of a session: the claims minus the validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl SessionUser {
    /// Projects decoded claims onto a user.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.subject.clone(),
            name: claims
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned()),
            email: claims.email.clone(),
            roles: claims.roles.clone(),
        }
    }

    /// Returns `true` if the user carries `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|r| r == role))
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Where a session stands at a given instant.
///
/// ```text
///   Anonymous ──(login)──→ Active ──(time passes exp)──→ Expired
///       ↑                    │  ↑                           │
///       └─────(logout)───────┘  └───────(refresh)───────────┤
///       ↑                                                   │
///       └──────────────────────(logout)─────────────────────┘
/// ```
///
/// `Active → Expired` has no event behind it: the phase is computed from
/// the token and a `now`, so it flips the first time someone looks after
/// the expiry instant. For gating, `Expired` counts as not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No user.
    Anonymous,
    /// User present and the token is valid.
    Active,
    /// User present but the token is missing, unreadable, or past expiry.
    Expired,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Active => write!(f, "Active"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// A snapshot of the session: current user and current token.
///
/// Only the store constructs signed-in states, and it always sets both
/// fields together. A seed may start with a user and no token; such a
/// state is [`SessionPhase::Expired`] until the next login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    user: Option<SessionUser>,
    token: Option<Token>,
}

impl SessionState {
    /// The signed-out state.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn signed_in(user: SessionUser, token: Token) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
        }
    }

    /// Builds the starting state from a seed.
    ///
    /// An explicit `initial_user` wins. Otherwise the user is read from
    /// `initial_token`; a token that doesn't decode yields no user.
    pub fn from_seed(seed: SessionSeed) -> Self {
        let SessionSeed {
            initial_user,
            initial_token,
        } = seed;
        let user = initial_user.or_else(|| {
            initial_token
                .as_ref()
                .and_then(|t| intervest_token::decode(t.as_str()))
                .map(|claims| SessionUser::from_claims(&claims))
        });
        Self {
            user,
            token: initial_token,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// `user` and `token` present, and the token not expired at `now`.
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.phase_at(now) == SessionPhase::Active
    }

    pub fn phase_at(&self, now: i64) -> SessionPhase {
        match (&self.user, &self.token) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), Some(token)) if !policy::is_expired(token.as_str(), now) => {
                SessionPhase::Active
            }
            (Some(_), _) => SessionPhase::Expired,
        }
    }
}
