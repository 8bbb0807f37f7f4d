//! Unified error type for the Intervest session layer.

use intervest_session::SessionError;
use intervest_token::TokenError;

/// Top-level error that wraps each crate's errors.
///
/// When using the `intervest` crate you deal with this single type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert automatically.
#[derive(Debug, thiserror::Error)]
pub enum IntervestError {
    /// Encoding or decoding a token failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A session operation failed (validation, authentication, issuance).
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntervestError {
    /// Returns `true` for errors the user can fix by correcting the form
    /// (as opposed to something going wrong underneath).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::EmptyEmail | SessionError::AuthFailed(_))
        )
    }
}
