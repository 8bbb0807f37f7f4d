//! Error types for the token layer.

/// Why a token could not be produced or read.
///
/// [`decode`](crate::decode) never surfaces these: it folds every variant
/// into `None`. They exist so [`try_decode`](crate::try_decode) and the
/// logs can say *which* step rejected a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Claims could not be serialized to JSON.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The token does not have the `header.payload[.signature]` shape.
    #[error("malformed token: expected 2 or 3 segments, found {0}")]
    Malformed(usize),

    /// The payload segment is not valid URL-safe base64.
    #[error("payload is not url-safe base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded to bytes that are not a claims object.
    #[error("payload is not a claims object: {0}")]
    Json(serde_json::Error),
}
