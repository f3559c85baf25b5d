//! Transport-free request gate.
//!
//! The HTTP layer hands over the raw `Authorization` header value; the gate
//! extracts the bearer token, verifies it and enforces the role requirement.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::claims::TokenClaims;
use crate::codec::TokenCodec;
use crate::policy::Requirement;
use crate::Role;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied: insufficient privileges")]
    InsufficientRole,
}

impl GateError {
    /// Forbidden (valid identity, wrong role) as opposed to unauthenticated.
    pub fn is_forbidden(self) -> bool {
        matches!(self, GateError::InsufficientRole)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, GateError> {
    let token = header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(GateError::MissingToken)?;

    if token.is_empty() {
        return Err(GateError::MissingToken);
    }
    Ok(token)
}

/// A role requirement applied to incoming requests.
///
/// An empty role set admits any authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gate {
    required: BTreeSet<Role>,
}

impl Gate {
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: roles.into_iter().collect(),
        }
    }

    /// Gate for a policy requirement; `None` for public actions.
    pub fn for_requirement(requirement: Requirement) -> Option<Self> {
        match requirement {
            Requirement::Public => None,
            Requirement::Authenticated => Some(Self::any_authenticated()),
            Requirement::Role(role) => Some(Self::roles([role])),
        }
    }

    pub fn admits(&self, role: Role) -> bool {
        self.required.is_empty() || self.required.contains(&role)
    }

    pub fn check_at(
        &self,
        codec: &dyn TokenCodec,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, GateError> {
        let token = extract_bearer(authorization)?;

        let claims = codec.verify_at(token, now).map_err(|e| {
            tracing::debug!(reason = %e, "credential rejected");
            GateError::InvalidToken
        })?;

        if !self.admits(claims.role) {
            tracing::debug!(
                user_id = %claims.sub,
                role = %claims.role,
                required = ?self.required,
                "role not admitted"
            );
            return Err(GateError::InsufficientRole);
        }

        Ok(claims)
    }

    pub fn check(
        &self,
        codec: &dyn TokenCodec,
        authorization: Option<&str>,
    ) -> Result<TokenClaims, GateError> {
        self.check_at(codec, authorization, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Hs256TokenCodec, SigningSecret};
    use crate::policy::Action;
    use chrono::{Duration, TimeZone};
    use harvestgate_core::UserId;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(SigningSecret::new("gate-secret").unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
    }

    fn bearer(codec: &Hs256TokenCodec, role: Role) -> String {
        let issued = codec.issue_at(UserId::new(), role, t0()).unwrap();
        format!("Bearer {}", issued.token)
    }

    #[test]
    fn missing_or_misshapen_header() {
        assert_eq!(extract_bearer(None), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("")), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("Bearer ")), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("Bearer    ")), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("Basic abc")), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("bearer abc")), Err(GateError::MissingToken));
        assert_eq!(extract_bearer(Some("Bearer abc")), Ok("abc"));
    }

    #[test]
    fn attaches_identity_for_admitted_role() {
        let codec = codec();
        let header = bearer(&codec, Role::Admin);
        let claims = Gate::roles([Role::Admin])
            .check_at(&codec, Some(&header), t0())
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let codec = codec();
        let header = bearer(&codec, Role::Operator);
        let err = Gate::roles([Role::Admin])
            .check_at(&codec, Some(&header), t0())
            .unwrap_err();
        assert_eq!(err, GateError::InsufficientRole);
        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), "Access denied: insufficient privileges");
    }

    #[test]
    fn empty_role_set_admits_everyone_authenticated() {
        let codec = codec();
        let gate = Gate::any_authenticated();
        for role in Role::ALL {
            let header = bearer(&codec, role);
            assert!(gate.check_at(&codec, Some(&header), t0()).is_ok());
        }
        assert_eq!(gate.check_at(&codec, None, t0()), Err(GateError::MissingToken));
    }

    #[test]
    fn expired_or_forged_tokens_are_unauthorized() {
        let codec = codec();
        let header = bearer(&codec, Role::Farmer);
        let gate = Gate::roles([Role::Farmer]);

        let later = t0() + Duration::hours(2);
        assert_eq!(gate.check_at(&codec, Some(&header), later), Err(GateError::InvalidToken));

        let other = Hs256TokenCodec::new(SigningSecret::new("other").unwrap());
        assert_eq!(gate.check_at(&other, Some(&header), t0()), Err(GateError::InvalidToken));

        assert_eq!(
            gate.check_at(&codec, Some("Bearer not.a.jwt"), t0()),
            Err(GateError::InvalidToken)
        );
    }

    #[test]
    fn gates_follow_the_action_table() {
        assert_eq!(Gate::for_requirement(Action::Login.requirement()), None);
        assert_eq!(
            Gate::for_requirement(Action::CheckAuth.requirement()),
            Some(Gate::any_authenticated())
        );
        assert_eq!(
            Gate::for_requirement(Action::RegisterUser.requirement()),
            Some(Gate::roles([Role::Operator]))
        );
    }
}
