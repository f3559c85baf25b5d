//! `harvestgate-auth` — authorization policy engine.
//!
//! This crate is intentionally decoupled from HTTP and storage: credential
//! tokens, password digests, the role hierarchy and the navigation guard are
//! all plain functions over values.

pub mod claims;
pub mod codec;
pub mod gate;
pub mod guard;
pub mod password;
pub mod policy;
pub mod roles;
pub mod user;

pub use claims::{TokenClaims, TokenError, validate_claims};
pub use codec::{EmptySecret, Hs256TokenCodec, IssuedToken, SigningSecret, TokenCodec};
pub use gate::{Gate, GateError, extract_bearer};
pub use guard::{AuthView, RouteDecision, route_decision};
pub use password::{PasswordError, PasswordHash, PasswordHasher};
pub use policy::{Access, Action, AuthzError, Requirement, authorize_action, can_create, check_access};
pub use roles::{Namespace, Role, UnknownRole};
pub use user::{PublicUser, Registration, User};
