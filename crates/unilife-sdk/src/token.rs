//! Identity-token decoding.
//!
//! Tokens issued by the identity provider are JWTs:
//! `base64url(header).base64url(claims).base64url(signature)`. The claims
//! segment is encoded, not encrypted, so the expiry can be read without the
//! provider's key. Nothing here verifies signatures; the backend does that.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// base64url that accepts the claims segment with or without `=` padding.
const CLAIMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a token's claims could not be read.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token is not three dot-separated segments.
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),

    /// The claims segment is not valid base64url.
    #[error("claims segment is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The claims segment is not a JSON object.
    #[error("claims segment is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The claims carry no `exp`.
    #[error("token has no exp claim")]
    MissingExpiry,

    /// `exp` does not fit in the supported date range.
    #[error("exp claim {0} is out of range")]
    ExpiryOutOfRange(i64),
}

/// The subset of JWT claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Subject: the identity-provider user id.
    #[serde(default)]
    pub sub: Option<String>,
}

impl TokenClaims {
    /// Decode the claims segment of a raw JWT.
    pub fn decode(raw: &str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = raw.trim().split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::Segments(segments.len()));
        }
        let bytes = CLAIMS_ENGINE.decode(segments[1])?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The `exp` claim as an instant.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        let exp = self.exp.ok_or(TokenError::MissingExpiry)?;
        DateTime::from_timestamp(exp, 0).ok_or(TokenError::ExpiryOutOfRange(exp))
    }
}

/// Read the expiry embedded in a raw token.
///
/// Callers treat an error as "unknown expiry".
pub fn decode_expiry(raw: &str) -> Result<DateTime<Utc>, TokenError> {
    TokenClaims::decode(raw)?.expires_at()
}

/// A bearer token as handed out by the identity provider.
///
/// Equality is by value: two tokens are the same session credential iff
/// their raw strings match.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken {
    raw: String,
}

impl IdentityToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw bearer value.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decode the claims segment.
    pub fn claims(&self) -> Result<TokenClaims, TokenError> {
        TokenClaims::decode(&self.raw)
    }

    /// The embedded expiry, see [`decode_expiry`].
    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        decode_expiry(&self.raw)
    }
}

// Never print the bearer value.
impl std::fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail = self
            .raw
            .char_indices()
            .rev()
            .nth(5)
            .map_or("", |(i, _)| &self.raw[i..]);
        write!(f, "IdentityToken(…{tail})")
    }
}
