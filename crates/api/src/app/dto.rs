use serde::{Deserialize, Serialize};

use harvestgate_auth::{PublicUser, Role, TokenClaims};
use harvestgate_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub role: Role,
    pub user: PublicUser,
}

/// Decoded identity as returned by `check-auth`.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub id: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl From<&TokenClaims> for IdentityResponse {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: IdentityResponse,
}
