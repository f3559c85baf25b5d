//! Navigation policy shared by every client: given the current path and the
//! auth state, where (if anywhere) should the user be sent?

use serde::Serialize;

use crate::policy::{check_access, Access};
use crate::{Namespace, Role};

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Prefixes reachable without a session. Matched as plain string prefixes so
/// pages like `/register-admin` stay public.
pub const PUBLIC_PREFIXES: [&str; 2] = ["/login", "/register"];

/// What the guard knows about the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "role")]
pub enum AuthView {
    Anonymous,
    /// Signed in; `None` when the session user's role is not one we know.
    Authenticated(Option<Role>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "target")]
pub enum RouteDecision {
    Stay,
    Redirect(&'static str),
}

impl RouteDecision {
    pub fn target(self) -> Option<&'static str> {
        match self {
            RouteDecision::Stay => None,
            RouteDecision::Redirect(target) => Some(target),
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == ROOT_PATH || path.starts_with("/?")
}

/// Decide where a navigation to `path` should end up.
pub fn route_decision(path: &str, view: AuthView) -> RouteDecision {
    let role = match view {
        AuthView::Anonymous if is_public_path(path) => return RouteDecision::Stay,
        AuthView::Anonymous => return RouteDecision::Redirect(LOGIN_PATH),
        AuthView::Authenticated(role) => role,
    };

    if is_root(path) {
        return match role {
            Some(role) => RouteDecision::Redirect(role.namespace().path()),
            None => RouteDecision::Redirect(UNAUTHORIZED_PATH),
        };
    }

    let Some(namespace) = Namespace::from_path(path) else {
        return RouteDecision::Stay;
    };

    match role.map(|r| check_access(r, namespace)) {
        Some(Access::Allow) => RouteDecision::Stay,
        Some(Access::Forbidden) | None => RouteDecision::Redirect(UNAUTHORIZED_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FARMER: AuthView = AuthView::Authenticated(Some(Role::Farmer));
    const ADMIN: AuthView = AuthView::Authenticated(Some(Role::Admin));
    const UNKNOWN: AuthView = AuthView::Authenticated(None);

    #[test]
    fn anonymous_user_is_sent_to_login() {
        assert_eq!(route_decision("/farmer", AuthView::Anonymous), RouteDecision::Redirect(LOGIN_PATH));
        assert_eq!(route_decision("/", AuthView::Anonymous), RouteDecision::Redirect(LOGIN_PATH));
        assert_eq!(
            route_decision("/unauthorized", AuthView::Anonymous),
            RouteDecision::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn anonymous_user_may_use_public_pages() {
        assert_eq!(route_decision("/login", AuthView::Anonymous), RouteDecision::Stay);
        assert_eq!(route_decision("/register", AuthView::Anonymous), RouteDecision::Stay);
        assert_eq!(route_decision("/register-admin", AuthView::Anonymous), RouteDecision::Stay);
    }

    #[test]
    fn farmer_visiting_admin_is_unauthorized() {
        assert_eq!(route_decision("/admin", FARMER), RouteDecision::Redirect(UNAUTHORIZED_PATH));
        assert_eq!(route_decision("/operator/farms", FARMER), RouteDecision::Redirect(UNAUTHORIZED_PATH));
        assert_eq!(route_decision("/farmer/fields", FARMER), RouteDecision::Stay);
    }

    #[test]
    fn root_redirects_to_owned_namespace() {
        assert_eq!(route_decision("/", ADMIN), RouteDecision::Redirect("/admin"));
        assert_eq!(
            route_decision("/", AuthView::Authenticated(Some(Role::Operator))),
            RouteDecision::Redirect("/operator")
        );
        assert_eq!(route_decision("/", FARMER), RouteDecision::Redirect("/farmer"));
        assert_eq!(route_decision("/", UNKNOWN), RouteDecision::Redirect(UNAUTHORIZED_PATH));
    }

    #[test]
    fn unknown_role_cannot_enter_any_namespace() {
        for ns in Namespace::ALL {
            assert_eq!(route_decision(ns.path(), UNKNOWN), RouteDecision::Redirect(UNAUTHORIZED_PATH));
        }
    }

    #[test]
    fn authenticated_user_outside_namespaces_stays() {
        assert_eq!(route_decision("/unauthorized", FARMER), RouteDecision::Stay);
        assert_eq!(route_decision("/login", ADMIN), RouteDecision::Stay);
        assert_eq!(route_decision("/administrator", FARMER), RouteDecision::Stay);
    }

    #[test]
    fn guard_and_access_table_agree() {
        for role in Role::ALL {
            for ns in Namespace::ALL {
                let decision = route_decision(ns.path(), AuthView::Authenticated(Some(role)));
                let allowed = check_access(role, ns) == Access::Allow;
                assert_eq!(decision == RouteDecision::Stay, allowed, "{role} on {ns}");
            }
        }
    }
}
