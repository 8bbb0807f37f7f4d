//! Token payload types.
//!
//! [`Claims`] is the structured set of facts carried inside a session
//! token; [`Token`] is the opaque text that carries them around.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The decoded payload of a session token.
///
/// Field names on the wire follow the usual JWT registered claim names
/// (`sub`, `iat`, `exp`) so the payload is readable by any JWT inspector.
///
/// Optional fields are omitted from the JSON when absent rather than
/// written as `null`. An explicit `null` is still accepted on decode and
/// read as `None`, which keeps `decode(encode(c)) == c` for every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Stable identity key.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Human-readable name.
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Authorization tags, in the order they were granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// Issuance time, Unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Absolute expiry, Unix seconds. Never earlier than `issued_at` for
    /// claims built by [`Claims::new`].
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Builds claims for `subject` valid from `now` for `ttl_secs` seconds.
    ///
    /// The expiry saturates at `i64::MAX` instead of overflowing.
    pub fn new(subject: impl Into<String>, now: i64, ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            subject: subject.into(),
            display_name: None,
            email: None,
            roles: None,
            issued_at: now,
            expires_at: now.saturating_add(ttl),
        }
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_roles(mut self, roles: Option<Vec<String>>) -> Self {
        self.roles = roles;
        self
    }

    /// Seconds left until expiry at `now`. Negative once expired.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// Returns `true` once `now` has reached the expiry instant.
    ///
    /// The boundary is inclusive: a token expiring at `t` is already
    /// expired at `t`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// An encoded session token.
///
/// A newtype over `String` so a token can't be confused with any other
/// string in a signature (an email, a path, a user id). Serializes as the
/// bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Claims {
        Claims::new("u-1", 1000, 900)
            .with_display_name(Some("ada lovelace".into()))
            .with_email(Some("ada.lovelace@example.com".into()))
            .with_roles(Some(vec!["admin".into(), "analyst".into()]))
    }

    // =====================================================================
    // Claims
    // =====================================================================

    #[test]
    fn test_claims_new_sets_validity_window() {
        let claims = Claims::new("u-1", 1000, 900);
        assert_eq!(claims.issued_at, 1000);
        assert_eq!(claims.expires_at, 1900);
        assert!(claims.display_name.is_none());
    }

    #[test]
    fn test_claims_new_huge_ttl_saturates() {
        let claims = Claims::new("u-1", 1000, u64::MAX);
        assert_eq!(claims.expires_at, i64::MAX);
    }

    #[test]
    fn test_claims_serialize_uses_jwt_names() {
        let json = serde_json::to_value(ada()).unwrap();
        assert_eq!(json["sub"], "u-1");
        assert_eq!(json["name"], "ada lovelace");
        assert_eq!(json["iat"], 1000);
        assert_eq!(json["exp"], 1900);
        assert_eq!(json["roles"][1], "analyst");
    }

    #[test]
    fn test_claims_serialize_omits_absent_fields() {
        let json = serde_json::to_string(&Claims::new("u-2", 5, 10)).unwrap();
        assert_eq!(json, r#"{"sub":"u-2","iat":5,"exp":15}"#);
    }

    #[test]
    fn test_claims_deserialize_null_reads_as_none() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u-3","name":null,"email":null,"roles":null,"iat":1,"exp":2}"#,
        )
        .unwrap();
        assert_eq!(claims, Claims::new("u-3", 1, 1));
    }

    #[test]
    fn test_claims_is_expired_at_boundary_inclusive() {
        let claims = Claims::new("u-1", 1000, 900);
        assert!(!claims.is_expired_at(1899));
        assert!(claims.is_expired_at(1900));
        assert_eq!(claims.remaining_secs(1850), 50);
        assert_eq!(claims.remaining_secs(2000), -100);
    }

    // =====================================================================
    // Token
    // =====================================================================

    #[test]
    fn test_token_serializes_as_plain_string() {
        let json = serde_json::to_string(&Token::from("a.b.")).unwrap();
        assert_eq!(json, "\"a.b.\"");
    }

    #[test]
    fn test_token_display_is_raw_text() {
        assert_eq!(Token::from("x.y.").to_string(), "x.y.");
    }
}
