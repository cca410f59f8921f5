//! Bearer token inspection.
//!
//! Access tokens are JWTs signed by the server. The client cannot verify the
//! signature, it only reads the payload to find out when the token stops
//! being accepted. Anything that does not decode cleanly counts as expired.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is not a three-part JWT")]
    Malformed,

    #[error("Token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not valid claims JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims read from a token payload. Anything unrecognized lands in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch
    #[serde(default)]
    pub exp: Option<f64>,
    /// Issued at, seconds since the Unix epoch
    #[serde(default)]
    pub iat: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenClaims {
    /// Subject, when it is a string. Issuers differ on its type.
    pub fn sub(&self) -> Option<&str> {
        self.extra.get("sub").and_then(|v| v.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(|v| v.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp?;
        DateTime::from_timestamp(exp.trunc() as i64, 0)
    }
}

/// Decode the payload segment of a JWT without checking its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    // Some issuers keep the padding even in the url-safe alphabet
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Whether `token` has expired. Undecodable tokens and tokens without an
/// `exp` claim are reported as expired.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        // Sub-second precision on both sides
        Ok(TokenClaims { exp: Some(exp), .. }) => exp < now.timestamp_millis() as f64 / 1000.0,
        Ok(_) => true,
        Err(_) => true,
    }
}
