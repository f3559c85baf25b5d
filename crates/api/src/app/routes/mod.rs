use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use harvestgate_auth::{Action, Gate, TokenCodec};

use crate::app::services::AppServices;
use crate::middleware::{auth_middleware, AuthState};

pub mod system;
pub mod users;

/// Router for the account API. Each route is gated by the requirement the
/// role policy assigns to its action.
pub fn router(services: Arc<AppServices>, codec: Arc<dyn TokenCodec>) -> Router {
    let gated = |action: Action, routes: Router| -> Router {
        match Gate::for_requirement(action.requirement()) {
            None => routes,
            Some(gate) => routes.route_layer(axum::middleware::from_fn_with_state(
                AuthState {
                    codec: codec.clone(),
                    gate,
                },
                auth_middleware,
            )),
        }
    };

    Router::new()
        .merge(gated(
            Action::RegisterAdmin,
            Router::new().route("/register-admin", post(users::register_admin)),
        ))
        .merge(gated(
            Action::RegisterOperator,
            Router::new().route("/register-operator", post(users::register_operator)),
        ))
        .merge(gated(
            Action::RegisterUser,
            Router::new().route("/register-user", post(users::register_user)),
        ))
        .merge(gated(
            Action::Login,
            Router::new().route("/login", post(users::login)),
        ))
        .merge(gated(
            Action::ListUsers,
            Router::new().route("/users", get(users::list_users)),
        ))
        .merge(gated(
            Action::Logout,
            Router::new().route("/logout", post(users::logout)),
        ))
        .merge(gated(
            Action::CheckAuth,
            Router::new().route("/check-auth", get(users::check_auth)),
        ))
        .layer(Extension(services))
}
