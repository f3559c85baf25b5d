//! Role hierarchy policy.
//!
//! - No IO
//! - No panics
//! - Pure decisions over the closed [`Role`] set
//!
//! Admins create operators, operators create farmers, and each role owns
//! exactly one route namespace. Registering an ADMIN is public: any caller,
//! authenticated or not, may create an admin account.

use serde::Serialize;
use thiserror::Error;

use crate::{Namespace, Role};

/// Operations of the account API, each with a fixed actor requirement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RegisterAdmin,
    RegisterOperator,
    RegisterUser,
    Login,
    ListUsers,
    CheckAuth,
    Logout,
}

/// Who may perform an [`Action`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum Requirement {
    /// No credential needed.
    Public,
    /// Any valid credential, whatever its role.
    Authenticated,
    /// A valid credential carrying exactly this role.
    Role(Role),
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::RegisterAdmin,
        Action::RegisterOperator,
        Action::RegisterUser,
        Action::Login,
        Action::ListUsers,
        Action::CheckAuth,
        Action::Logout,
    ];

    pub fn requirement(self) -> Requirement {
        match self {
            Action::RegisterAdmin | Action::Login | Action::Logout => Requirement::Public,
            Action::RegisterOperator => Requirement::Role(Role::Admin),
            Action::RegisterUser => Requirement::Role(Role::Operator),
            Action::ListUsers => Requirement::Role(Role::Admin),
            Action::CheckAuth => Requirement::Authenticated,
        }
    }

    /// Role assigned to the account a registration action creates.
    pub fn created_role(self) -> Option<Role> {
        match self {
            Action::RegisterAdmin => Some(Role::Admin),
            Action::RegisterOperator => Some(Role::Operator),
            Action::RegisterUser => Some(Role::Farmer),
            Action::Login | Action::ListUsers | Action::CheckAuth | Action::Logout => None,
        }
    }

    /// The registration action that creates accounts of `role`.
    pub fn registering(role: Role) -> Action {
        match role {
            Role::Admin => Action::RegisterAdmin,
            Role::Operator => Action::RegisterOperator,
            Role::Farmer => Action::RegisterUser,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required for {0:?}")]
    Unauthenticated(Action),

    #[error("forbidden: {action:?} requires {required}")]
    Forbidden { action: Action, required: Role },
}

/// Decide whether an actor (or an anonymous caller) may perform `action`.
pub fn authorize_action(action: Action, actor: Option<Role>) -> Result<(), AuthzError> {
    match (action.requirement(), actor) {
        (Requirement::Public, _) => Ok(()),
        (Requirement::Authenticated, Some(_)) => Ok(()),
        (Requirement::Role(required), Some(role)) if role == required => Ok(()),
        (Requirement::Role(required), Some(_)) => Err(AuthzError::Forbidden { action, required }),
        (Requirement::Authenticated | Requirement::Role(_), None) => {
            Err(AuthzError::Unauthenticated(action))
        }
    }
}

/// Whether `actor` may register an account with role `target`.
pub fn can_create(actor: Option<Role>, target: Role) -> bool {
    match target {
        Role::Admin => true,
        Role::Operator | Role::Farmer => {
            actor.is_some_and(|role| role.creatable().contains(&target))
        }
    }
}

/// Outcome of a namespace access check for an authenticated role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Allow,
    Forbidden,
}

pub fn check_access(role: Role, namespace: Namespace) -> Access {
    if role.namespace() == namespace {
        Access::Allow
    } else {
        Access::Forbidden
    }
}
