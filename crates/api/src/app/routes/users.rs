use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use harvestgate_auth::{Registration, Role};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// POST /register-admin (public)
pub async fn register_admin(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    register(services, None, Role::Admin, body).await
}

/// POST /register-operator (ADMIN)
pub async fn register_operator(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    register(services, Some(principal), Role::Operator, body).await
}

/// POST /register-user (OPERATOR). Creates a FARMER.
pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    register(services, Some(principal), Role::Farmer, body).await
}

async fn register(
    services: Arc<AppServices>,
    principal: Option<PrincipalContext>,
    target: Role,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    let registration = match Registration::parse(&body.name, &body.email, &body.password) {
        Ok(r) => r,
        Err(e) => return errors::account_error_to_response(e.into()),
    };

    let actor = principal.map(|p| p.claims().clone());
    let user = match services.register(actor, target, registration).await {
        Ok(u) => u,
        Err(e) => return errors::account_error_to_response(e),
    };

    let body = match target {
        Role::Admin => serde_json::json!({ "message": "Admin registered", "admin": user }),
        Role::Operator => serde_json::json!({ "message": "Operator registered", "operator": user }),
        Role::Farmer => serde_json::json!({ "message": "User registered", "user": user }),
    };

    (StatusCode::CREATED, Json(body)).into_response()
}

/// POST /login (public)
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.login(body.email, body.password).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(dto::LoginResponse {
                message: "Login successful",
                token: outcome.token.token,
                role: outcome.user.role,
                user: outcome.user,
            }),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /users (ADMIN)
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.list_users(principal.claims().clone()).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /logout (public)
///
/// Tokens are stateless; the client drops its copy. A token presented again
/// after logout keeps working until it expires.
pub async fn logout() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Logout successful" })),
    )
        .into_response()
}

/// GET /check-auth (any authenticated role)
pub async fn check_auth(Extension(principal): Extension<PrincipalContext>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(dto::CheckAuthResponse {
            success: true,
            message: "Authenticated user!",
            user: dto::IdentityResponse::from(principal.claims()),
        }),
    )
        .into_response()
}
