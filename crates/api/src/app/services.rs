//! Service wiring for the account API.
//!
//! Password hashing is CPU-bound, so account operations run on the blocking
//! pool rather than on the async workers.

use std::sync::Arc;

use chrono::Utc;

use harvestgate_auth::{PasswordHasher, PublicUser, Registration, Role, TokenClaims, TokenCodec};
use harvestgate_infra::{AccountError, AccountService, InMemoryUserStore, LoginOutcome, UserStore};

type Accounts = AccountService<Arc<dyn UserStore>>;

pub struct AppServices {
    accounts: Arc<Accounts>,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>, codec: Arc<dyn TokenCodec>, hasher: PasswordHasher) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store, codec, hasher)),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(codec: Arc<dyn TokenCodec>) -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()), codec, PasswordHasher::new())
    }

    pub async fn register(
        &self,
        actor: Option<TokenClaims>,
        target: Role,
        registration: Registration,
    ) -> Result<PublicUser, AccountError> {
        self.blocking(move |accounts| accounts.register(actor.as_ref(), target, registration, Utc::now()))
            .await
    }

    pub async fn login(&self, email: String, password: String) -> Result<LoginOutcome, AccountError> {
        self.blocking(move |accounts| accounts.login(&email, &password, Utc::now()))
            .await
    }

    pub async fn list_users(&self, actor: TokenClaims) -> Result<Vec<PublicUser>, AccountError> {
        self.blocking(move |accounts| accounts.list_users(Some(&actor))).await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, AccountError>
    where
        T: Send + 'static,
        F: FnOnce(&Accounts) -> Result<T, AccountError> + Send + 'static,
    {
        let accounts = self.accounts.clone();
        match tokio::task::spawn_blocking(move || f(&accounts)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "account task failed");
                Err(AccountError::Internal)
            }
        }
    }
}
