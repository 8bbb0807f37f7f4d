//! Session management for Intervest.
//!
//! This crate owns the lifecycle of a signed-in user:
//!
//! 1. **Login**: turning credentials into an identity ([`Authenticator`])
//!    and an issued token ([`TokenPolicy`])
//! 2. **State**: who is signed in right now ([`SessionStore`],
//!    [`SessionState`])
//! 3. **Expiry and refresh**: lazy, clock-driven checks and the
//!    sliding-window refresh ([`policy`], [`Clock`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard (intervest)  ← reads is_authenticated() to render or redirect
//!     ↕
//! Session (this crate)  ← owns user + token, issues and refreshes
//!     ↕
//! Token (intervest-token)  ← Claims ⇄ text
//! ```

mod auth;
mod clock;
mod error;
pub mod policy;
mod session;
mod store;

pub use auth::{Authenticator, LocalAuthenticator, LoginRequest, display_name_from_email};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use policy::{Refresh, TokenPolicy};
pub use session::{
    DEFAULT_DISPLAY_NAME, SessionConfig, SessionPhase, SessionSeed, SessionState, SessionUser,
};
pub use store::{SessionStore, SessionStoreBuilder};
