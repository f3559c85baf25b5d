//! `harvestgate-client` — client-side session handling.
//!
//! Holds the credential in a cookie-like session store, keeps an observable
//! auth state in sync with the server, and runs the navigation guard over it.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod state;

pub use api::{AuthClient, NewAccount};
pub use config::ClientConfig;
pub use error::ClientError;
pub use guard::{Navigator, RouteGuard};
pub use session::{Clock, CookieSessionStore, SessionStore};
pub use state::{AuthOutcome, AuthSnapshot, AuthStore, RequestSeq, SessionUser};
