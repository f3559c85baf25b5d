use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried by every user and every credential token.
///
/// The set is closed: policy decisions match on it exhaustively, so adding a
/// role forces every rule in [`crate::policy`] to be revisited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Operator,
    Farmer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::Farmer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Operator => "OPERATOR",
            Role::Farmer => "FARMER",
        }
    }

    /// The single route namespace this role owns.
    pub fn namespace(self) -> Namespace {
        match self {
            Role::Admin => Namespace::Admin,
            Role::Operator => Namespace::Operator,
            Role::Farmer => Namespace::Farmer,
        }
    }

    /// Roles an authenticated user with this role may register.
    pub fn creatable(self) -> &'static [Role] {
        match self {
            Role::Admin => &[Role::Operator],
            Role::Operator => &[Role::Farmer],
            Role::Farmer => &[],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "OPERATOR" => Ok(Role::Operator),
            "FARMER" => Ok(Role::Farmer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Top-level route prefix exclusively owned by one role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Admin,
    Operator,
    Farmer,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Admin, Namespace::Operator, Namespace::Farmer];

    pub fn path(self) -> &'static str {
        match self {
            Namespace::Admin => "/admin",
            Namespace::Operator => "/operator",
            Namespace::Farmer => "/farmer",
        }
    }

    pub fn owner(self) -> Role {
        match self {
            Namespace::Admin => Role::Admin,
            Namespace::Operator => Role::Operator,
            Namespace::Farmer => Role::Farmer,
        }
    }

    /// Resolve the namespace a path falls under.
    ///
    /// Matching is per path segment: `/admin/users` is in `/admin`,
    /// `/administrator` is not.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ns| path_has_prefix(path, ns.path()))
    }
}

impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
