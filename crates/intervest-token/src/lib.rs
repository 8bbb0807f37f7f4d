//! Session tokens for Intervest.
//!
//! This crate defines what a session token *is*:
//!
//! - **Types** ([`Claims`], [`Token`]): the payload and its encoded form.
//! - **Codec** ([`TokenCodec`] trait, [`UnsignedJwtCodec`]): how claims
//!   become a URL-safe `header.payload.` string and back.
//! - **Errors** ([`TokenError`]): why encoding or decoding failed.
//!
//! It knows nothing about time, sessions, or users. Expiry and refresh
//! live one layer up, in `intervest-session`.
//!
//! ```text
//! Guard (intervest)  ← render / redirect
//!     ↕
//! Session (intervest-session)  ← policy, clock, store
//!     ↕
//! Token (this crate)  ← claims ⇄ text
//! ```
//!
//! The free functions [`encode`], [`decode`] and [`try_decode`] use
//! [`UnsignedJwtCodec`].

mod codec;
mod error;
mod types;

pub use codec::{TokenCodec, UNSIGNED_HEADER, UnsignedJwtCodec};
pub use error::TokenError;
pub use types::{Claims, Token};

/// Encodes claims with [`UnsignedJwtCodec`].
///
/// # Errors
/// Returns [`TokenError::Encode`] if the claims can't be serialized.
pub fn encode(claims: &Claims) -> Result<Token, TokenError> {
    UnsignedJwtCodec.encode(claims)
}

/// Decodes a token with [`UnsignedJwtCodec`]. Malformed input yields `None`.
pub fn decode(token: &str) -> Option<Claims> {
    UnsignedJwtCodec.decode(token)
}

/// Decodes a token with [`UnsignedJwtCodec`], keeping the failure reason.
///
/// # Errors
/// See [`TokenCodec::try_decode`].
pub fn try_decode(token: &str) -> Result<Claims, TokenError> {
    UnsignedJwtCodec.try_decode(token)
}
