//! Token policy: issuance, expiry, and the sliding-window refresh.
//!
//! Everything here is a pure function of its inputs, `now` included.
//! Nothing reads a clock and nothing holds state, which is what lets the
//! store and the tests drive time explicitly.
//!
//! # Sliding window
//!
//! ```text
//!  issued_at                      expires_at - window      expires_at
//!      │◄────── no-op refresh ──────────►│◄── re-issue ──────►│◄── re-issue ──
//! ```
//!
//! A refresh well before expiry changes nothing. Inside the window, and
//! also after expiry, it re-issues the same identity with a fresh
//! `issued_at`/`expires_at`. Resurrecting an expired token is allowed:
//! there's no server to revoke it.

use intervest_token::{Claims, Token, TokenCodec, TokenError, UnsignedJwtCodec};

use crate::{SessionConfig, SessionUser};

/// Outcome of [`TokenPolicy::maybe_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    /// The token to keep using: new if `refreshed`, otherwise the input.
    pub token: Token,
    /// Whether a new token was issued.
    pub refreshed: bool,
    /// Claims of `token`, or `None` if the input didn't decode.
    pub claims: Option<Claims>,
}

/// Issues, inspects, and refreshes tokens with a fixed ttl and window.
#[derive(Debug, Clone)]
pub struct TokenPolicy<C: TokenCodec = UnsignedJwtCodec> {
    ttl_secs: u64,
    refresh_window_secs: u64,
    codec: C,
}

impl TokenPolicy {
    pub fn new(ttl_secs: u64, refresh_window_secs: u64) -> Self {
        Self::with_codec(UnsignedJwtCodec, ttl_secs, refresh_window_secs)
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.token_ttl_secs, config.refresh_window_secs)
    }
}

impl<C: TokenCodec> TokenPolicy<C> {
    pub fn with_codec(codec: C, ttl_secs: u64, refresh_window_secs: u64) -> Self {
        Self {
            ttl_secs,
            refresh_window_secs,
            codec,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn refresh_window_secs(&self) -> u64 {
        self.refresh_window_secs
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Issues a token valid from `now` for the policy's ttl.
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if the claims can't be encoded.
    pub fn issue(
        &self,
        subject: impl Into<String>,
        display_name: Option<String>,
        email: Option<String>,
        roles: Option<Vec<String>>,
        now: i64,
    ) -> Result<Token, TokenError> {
        let claims = Claims::new(subject, now, self.ttl_secs)
            .with_display_name(display_name)
            .with_email(email)
            .with_roles(roles);
        self.codec.encode(&claims)
    }

    /// Issues a token for `user`.
    ///
    /// # Errors
    /// See [`issue`](Self::issue).
    pub fn issue_for(&self, user: &SessionUser, now: i64) -> Result<Token, TokenError> {
        self.issue(
            user.id.clone(),
            Some(user.name.clone()),
            user.email.clone(),
            user.roles.clone(),
            now,
        )
    }

    /// Fail-closed expiry check: a token that doesn't decode is expired.
    pub fn is_expired(&self, token: &str, now: i64) -> bool {
        self.codec
            .decode(token)
            .is_none_or(|claims| claims.is_expired_at(now))
    }

    /// Re-issues `token` if it's inside the refresh window (or past it).
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if re-issuing fails. An undecodable
    /// input is not an error; it comes back unchanged with
    /// `refreshed: false` and `claims: None`.
    pub fn maybe_refresh(&self, token: &Token, now: i64) -> Result<Refresh, TokenError> {
        let Some(current) = self.codec.decode(token.as_str()) else {
            return Ok(Refresh {
                token: token.clone(),
                refreshed: false,
                claims: None,
            });
        };

        let window = i64::try_from(self.refresh_window_secs).unwrap_or(i64::MAX);
        if current.remaining_secs(now) > window {
            return Ok(Refresh {
                token: token.clone(),
                refreshed: false,
                claims: Some(current),
            });
        }

        let claims = Claims::new(current.subject, now, self.ttl_secs)
            .with_display_name(current.display_name)
            .with_email(current.email)
            .with_roles(current.roles);
        let token = self.codec.encode(&claims)?;
        Ok(Refresh {
            token,
            refreshed: true,
            claims: Some(claims),
        })
    }
}

// ---------------------------------------------------------------------------
// Free functions over the default codec
// ---------------------------------------------------------------------------

/// Issues a token for `subject` valid from `now` for `ttl_secs`.
///
/// # Errors
/// Returns [`TokenError::Encode`] if the claims can't be encoded.
pub fn issue(
    subject: impl Into<String>,
    display_name: Option<String>,
    email: Option<String>,
    roles: Option<Vec<String>>,
    ttl_secs: u64,
    now: i64,
) -> Result<Token, TokenError> {
    TokenPolicy::new(ttl_secs, 0).issue(subject, display_name, email, roles, now)
}

/// Returns `true` if `token` doesn't decode or has expired at `now`.
pub fn is_expired(token: &str, now: i64) -> bool {
    UnsignedJwtCodec
        .decode(token)
        .is_none_or(|claims| claims.is_expired_at(now))
}

/// Sliding-window refresh with an explicit window and ttl.
///
/// # Errors
/// See [`TokenPolicy::maybe_refresh`].
pub fn maybe_refresh(
    token: &Token,
    refresh_window_secs: u64,
    ttl_secs: u64,
    now: i64,
) -> Result<Refresh, TokenError> {
    TokenPolicy::new(ttl_secs, refresh_window_secs).maybe_refresh(token, now)
}
