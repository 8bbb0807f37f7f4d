//! Error types for the session layer.

use intervest_token::TokenError;

/// Errors returned by session operations.
///
/// None of these are fatal. A failed `login` leaves the previous session
/// state exactly as it was, and a caller that can't recover simply keeps
/// treating the user as anonymous.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Login was attempted without an email address.
    #[error("email is required")]
    EmptyEmail,

    /// The [`Authenticator`](crate::Authenticator) rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A token could not be issued.
    #[error(transparent)]
    Token(#[from] TokenError),
}
