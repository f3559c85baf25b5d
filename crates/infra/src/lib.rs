//! Infrastructure layer: user persistence and account orchestration.

pub mod accounts;
pub mod user_store;

pub use accounts::{AccountError, AccountService, LoginOutcome};
pub use user_store::{InMemoryUserStore, StoreError, UserStore};
