//! Codec trait and the unsigned JWT-shaped implementation.
//!
//! A "codec" turns [`Claims`] into a [`Token`] and back. The session layer
//! only talks to the [`TokenCodec`] trait, so a signed scheme could be
//! dropped in later without touching the policy or the store.
//!
//! [`UnsignedJwtCodec`] is the only implementation. Its tokens look like
//! a JWT with `alg: none`:
//!
//! ```text
//! <b64url(header json)>.<b64url(payload json)>.
//! ```
//!
//! The third segment is always empty. Nothing is signed and nothing is
//! verified; these tokens are not a security boundary.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::{Claims, Token, TokenError};

/// Fixed header for every token this codec issues.
pub const UNSIGNED_HEADER: &str = r#"{"alg":"none","typ":"JWT"}"#;

/// URL-safe alphabet (`-` and `_` instead of `+` and `/`). Encoding never
/// pads; decoding tolerates `=` padding so tokens produced by a padding
/// encoder still read back.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Converts claims to tokens and tokens back to claims.
///
/// ## Trait bounds
///
/// `Send + Sync + 'static` so a codec can live inside a store that is
/// shared across tasks behind an `Arc`.
pub trait TokenCodec: Send + Sync + 'static {
    /// Encodes claims into a token.
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if the claims can't be serialized.
    fn encode(&self, claims: &Claims) -> Result<Token, TokenError>;

    /// Decodes a token, reporting why it was rejected.
    ///
    /// # Errors
    /// - [`TokenError::Malformed`]: wrong number of segments
    /// - [`TokenError::Base64`]: payload segment isn't URL-safe base64
    /// - [`TokenError::Json`]: payload isn't a claims object
    fn try_decode(&self, token: &str) -> Result<Claims, TokenError>;

    /// Decodes a token, folding every failure into `None`.
    ///
    /// This is the call the session layer uses. Absence is the only error
    /// signal; callers treat it as "expired / not authenticated".
    fn decode(&self, token: &str) -> Option<Claims> {
        match self.try_decode(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UnsignedJwtCodec
// ---------------------------------------------------------------------------

/// A [`TokenCodec`] producing `alg: none` JWT-shaped tokens.
///
/// ## Example
///
/// ```rust
/// use intervest_token::{Claims, TokenCodec, UnsignedJwtCodec};
///
/// let codec = UnsignedJwtCodec;
/// let claims = Claims::new("u-1", 1000, 900);
///
/// let token = codec.encode(&claims).unwrap();
/// assert!(token.as_str().ends_with('.'));
/// assert_eq!(codec.decode(token.as_str()), Some(claims));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedJwtCodec;

impl TokenCodec for UnsignedJwtCodec {
    fn encode(&self, claims: &Claims) -> Result<Token, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(TokenError::Encode)?;
        let header = URL_SAFE.encode(UNSIGNED_HEADER);
        let payload = URL_SAFE.encode(payload);
        // Empty signature segment: the trailing dot is part of the format.
        Ok(Token::from(format!("{header}.{payload}.")))
    }

    fn try_decode(&self, token: &str) -> Result<Claims, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if !(2..=3).contains(&segments.len()) {
            return Err(TokenError::Malformed(segments.len()));
        }
        let payload = URL_SAFE.decode(segments[1])?;
        serde_json::from_slice(&payload).map_err(TokenError::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Claims {
        Claims::new("u-ada", 1000, 900)
            .with_display_name(Some("ada lovelace".into()))
            .with_email(Some("ada.lovelace@example.com".into()))
            .with_roles(Some(vec!["admin".into(), "viewer".into()]))
    }

    /// Builds a token from a raw payload string, bypassing `Claims`.
    fn raw_token(payload: &str) -> String {
        format!(
            "{}.{}.",
            URL_SAFE.encode(UNSIGNED_HEADER),
            URL_SAFE.encode(payload)
        )
    }

    // =====================================================================
    // encode()
    // =====================================================================

    #[test]
    fn test_encode_produces_three_segments_with_empty_signature() {
        let token = UnsignedJwtCodec.encode(&ada()).unwrap();

        let segments: Vec<&str> = token.as_str().split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments[2].is_empty(), "signature must stay empty");
    }

    #[test]
    fn test_encode_header_is_alg_none() {
        let token = UnsignedJwtCodec.encode(&ada()).unwrap();
        let header = token.as_str().split('.').next().unwrap();

        let bytes = URL_SAFE.decode(header).unwrap();
        assert_eq!(bytes, UNSIGNED_HEADER.as_bytes());
        // `{"alg":"none","typ":"JWT"}` in unpadded base64url.
        assert_eq!(header, "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0");
    }

    #[test]
    fn test_encode_uses_url_safe_alphabet_without_padding() {
        // `?`, `>` and `ÿ` land on `+`/`/` in the standard alphabet.
        let claims = Claims::new("???>>>~~~", 0, 1)
            .with_display_name(Some("ÿÿÿ".into()));
        let token = UnsignedJwtCodec.encode(&claims).unwrap();

        assert!(!token.as_str().contains('+'));
        assert!(!token.as_str().contains('/'));
        assert!(!token.as_str().contains('='));
    }

    // =====================================================================
    // decode()
    // =====================================================================

    #[test]
    fn test_decode_round_trips_full_claims() {
        let claims = ada();
        let token = UnsignedJwtCodec.encode(&claims).unwrap();

        assert_eq!(UnsignedJwtCodec.decode(token.as_str()), Some(claims));
    }

    #[test]
    fn test_decode_round_trips_minimal_claims() {
        let claims = Claims::new("u-min", -5, 0);
        let token = UnsignedJwtCodec.encode(&claims).unwrap();

        assert_eq!(UnsignedJwtCodec.decode(token.as_str()), Some(claims));
    }

    #[test]
    fn test_decode_accepts_two_segments() {
        let token = UnsignedJwtCodec.encode(&ada()).unwrap();
        let two = token.as_str().trim_end_matches('.');

        assert_eq!(UnsignedJwtCodec.decode(two), Some(ada()));
    }

    #[test]
    fn test_decode_accepts_padded_payload() {
        let padded = base64::engine::general_purpose::URL_SAFE
            .encode(r#"{"sub":"pq","iat":1,"exp":2}"#);
        assert!(padded.ends_with('='), "fixture should carry padding");

        let claims = UnsignedJwtCodec.decode(&format!("h.{padded}."));
        assert_eq!(claims, Some(Claims::new("pq", 1, 1)));
    }

    #[test]
    fn test_decode_ignores_header_and_signature_contents() {
        let payload = URL_SAFE.encode(r#"{"sub":"x","iat":0,"exp":9}"#);
        let claims = UnsignedJwtCodec.decode(&format!("garbage.{payload}.sig"));
        assert_eq!(claims, Some(Claims::new("x", 0, 9)));
    }

    #[test]
    fn test_decode_wrong_segment_count_returns_none() {
        for bad in ["", "nodots", "a.b.c.d", "....."] {
            assert!(
                UnsignedJwtCodec.decode(bad).is_none(),
                "{bad:?} should not decode"
            );
        }
    }

    #[test]
    fn test_try_decode_reports_segment_count() {
        let err = UnsignedJwtCodec.try_decode("a.b.c.d").unwrap_err();
        assert!(matches!(err, TokenError::Malformed(4)));
    }

    #[test]
    fn test_try_decode_bad_base64_reports_base64() {
        let err = UnsignedJwtCodec.try_decode("h.!!!.").unwrap_err();
        assert!(matches!(err, TokenError::Base64(_)));
    }

    #[test]
    fn test_try_decode_non_claims_json_reports_json() {
        let err = UnsignedJwtCodec
            .try_decode(&raw_token(r#"{"hello":"world"}"#))
            .unwrap_err();
        assert!(matches!(err, TokenError::Json(_)));

        let err = UnsignedJwtCodec.try_decode(&raw_token("not json")).unwrap_err();
        assert!(matches!(err, TokenError::Json(_)));
    }

    #[test]
    fn test_decode_empty_payload_returns_none() {
        assert!(UnsignedJwtCodec.decode("a..").is_none());
    }
}
