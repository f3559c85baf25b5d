use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use harvestgate_core::UserId;

use crate::Role;

/// Claims carried inside a credential token.
///
/// On the wire these are the registered JWT names (`sub`, `iat`, `exp`, with
/// timestamps in Unix seconds) plus the `role` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token could not be parsed")]
    Malformed,

    #[error("token could not be encoded: {0}")]
    Encoding(String),
}

/// Validate the time window of already-decoded claims.
///
/// A token is still valid at the exact second it expires; it is rejected once
/// `now` is strictly past `expires_at`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed);
    }
    if now > claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}
