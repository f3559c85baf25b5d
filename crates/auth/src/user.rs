//! User accounts as seen by the policy engine.
//!
//! Storage owns these records; this crate only consumes them as values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvestgate_core::{DomainError, DomainResult, Email, UserId};

use crate::password::PasswordHash;
use crate::Role;

/// A registered account.
///
/// The role is fixed at registration; there is no operation that changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// The shape of a user that may leave the server (no password digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Validated registration input, before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl Registration {
    pub fn parse(name: &str, email: &str, password: &str) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
        })
    }
}
