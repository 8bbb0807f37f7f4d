//! # Intervest
//!
//! Client-side session layer for the Intervest shell and its feature
//! modules.
//!
//! A shell holds one [`SessionStore`](intervest_session::SessionStore),
//! passes it to whatever needs to sign users in or out, and wraps every
//! protected view in an [`AccessGuard`]. The guard turns the store's
//! `is_authenticated()` into a [`GuardDecision`]: render, or redirect to
//! the login page carrying the path the user asked for.
//!
//! Tokens are unsigned and exist to make session behaviour inspectable
//! in demos and tests. They are not a security boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use intervest::prelude::*;
//!
//! # async fn demo() -> Result<(), IntervestError> {
//! let store = SessionStore::new(SessionConfig::default());
//! let guard = AccessGuard::default();
//!
//! assert!(!guard.check_session(&store, "reports", "/reports").is_render());
//!
//! store.login(LoginRequest::new("ada.lovelace@example.com")).await?;
//! assert!(guard.check_session(&store, "reports", "/reports").is_render());
//! # Ok(())
//! # }
//! ```

mod error;
mod guard;

pub use error::IntervestError;
pub use guard::{AccessGuard, DEFAULT_REDIRECT, GuardDecision};

/// Re-exports everything a shell needs.
pub mod prelude {
    pub use crate::{AccessGuard, DEFAULT_REDIRECT, GuardDecision, IntervestError};
    pub use intervest_session::{
        Authenticator, Clock, LocalAuthenticator, LoginRequest, ManualClock, SessionConfig,
        SessionError, SessionPhase, SessionSeed, SessionState, SessionStore, SessionUser,
        SystemClock, TokenPolicy,
    };
    pub use intervest_token::{Claims, Token, TokenError};
}
