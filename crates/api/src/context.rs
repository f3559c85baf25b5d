use harvestgate_auth::{Role, TokenClaims};
use harvestgate_core::UserId;

/// Principal context for a request (verified identity + role).
///
/// Inserted by the auth middleware; present on every gated route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    claims: TokenClaims,
}

impl PrincipalContext {
    pub fn new(claims: TokenClaims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}
