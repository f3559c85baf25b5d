//! User persistence abstraction plus an in-memory adapter for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use harvestgate_auth::User;
use harvestgate_core::{Email, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for user accounts (unique by email and by id).
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<(), StoreError>;
    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// All users, oldest registration first.
    fn list(&self) -> Result<Vec<User>, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user)
    }

    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id)
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    by_id: HashMap<UserId, usize>,
    by_email: HashMap<Email, usize>,
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if tables.by_email.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let slot = tables.users.len();
        tables.by_email.insert(user.email.clone(), slot);
        tables.by_id.insert(user.id, slot);
        tables.users.push(user);
        Ok(())
    }

    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables
            .by_email
            .get(email)
            .map(|slot| tables.users[*slot].clone()))
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.by_id.get(&id).map(|slot| tables.users[*slot].clone()))
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.users.clone())
    }
}
