//! Account orchestration: registration, login and listing.
//!
//! ```text
//! request
//!   ↓
//! 1. Role hierarchy check (pure policy)
//!   ↓
//! 2. Validate input / hash or verify password
//!   ↓
//! 3. Read or write the user store
//!   ↓
//! 4. Issue a credential token (login only)
//! ```
//!
//! Store failures are mapped here so nothing storage-specific reaches callers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use harvestgate_auth::{
    Action, AuthzError, IssuedToken, PasswordError, PasswordHasher, PublicUser, Registration, Role,
    TokenClaims, TokenCodec, TokenError, User, authorize_action,
};
use harvestgate_core::{DomainError, Email, UserId};

use crate::user_store::{StoreError, UserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: insufficient privileges")]
    Forbidden,

    #[error("User not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists")]
    Conflict,

    #[error("Internal server error")]
    Internal,
}

impl From<DomainError> for AccountError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => AccountError::Validation(msg),
        }
    }
}

impl From<AuthzError> for AccountError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated(_) => AccountError::Unauthenticated,
            AuthzError::Forbidden { .. } => AccountError::Forbidden,
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateEmail => AccountError::Conflict,
            StoreError::Unavailable(reason) => {
                tracing::error!(%reason, "user store failure");
                AccountError::Internal
            }
        }
    }
}

impl From<PasswordError> for AccountError {
    fn from(value: PasswordError) -> Self {
        tracing::error!(error = %value, "password hashing failed");
        AccountError::Internal
    }
}

impl From<TokenError> for AccountError {
    fn from(value: TokenError) -> Self {
        tracing::error!(error = %value, "token issuance failed");
        AccountError::Internal
    }
}

/// Successful login: the token plus the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: PublicUser,
}

/// Registration/login service over a user store and a token codec.
pub struct AccountService<S> {
    store: S,
    codec: Arc<dyn TokenCodec>,
    hasher: PasswordHasher,
}

impl<S> AccountService<S>
where
    S: UserStore,
{
    pub fn new(store: S, codec: Arc<dyn TokenCodec>, hasher: PasswordHasher) -> Self {
        Self { store, codec, hasher }
    }

    /// Register an account with role `target` on behalf of `actor`.
    ///
    /// `actor` is `None` for anonymous callers, which only succeeds for
    /// ADMIN registration.
    pub fn register(
        &self,
        actor: Option<&TokenClaims>,
        target: Role,
        registration: Registration,
        now: DateTime<Utc>,
    ) -> Result<PublicUser, AccountError> {
        authorize_action(Action::registering(target), actor.map(|c| c.role))?;

        let user = User {
            id: UserId::new(),
            name: registration.name,
            email: registration.email,
            password_hash: self.hasher.hash(&registration.password)?,
            role: target,
            created_at: now,
        };
        let public = user.public();

        self.store.insert(user)?;

        tracing::info!(
            user_id = %public.id,
            role = %target,
            created_by = ?actor.map(|c| c.sub),
            "user registered"
        );
        Ok(public)
    }

    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AccountError> {
        // An address that cannot be valid cannot be registered either.
        let email = Email::parse(email).map_err(|_| AccountError::NotFound)?;
        let user = self
            .store
            .find_by_email(&email)?
            .ok_or(AccountError::NotFound)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::info!(user_id = %user.id, "login rejected: bad password");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.codec.issue_at(user.id, user.role, now)?;
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");

        Ok(LoginOutcome {
            token,
            user: user.public(),
        })
    }

    pub fn list_users(&self, actor: Option<&TokenClaims>) -> Result<Vec<PublicUser>, AccountError> {
        authorize_action(Action::ListUsers, actor.map(|c| c.role))?;
        Ok(self.store.list()?.iter().map(User::public).collect())
    }
}
