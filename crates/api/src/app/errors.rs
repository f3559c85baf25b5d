use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use harvestgate_auth::GateError;
use harvestgate_infra::AccountError;

pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        AccountError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        AccountError::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "unauthorized", message),
        AccountError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", message),
        // Login reports an unknown email as a client error, not a missing resource.
        AccountError::NotFound => json_error(StatusCode::BAD_REQUEST, "not_found", message),
        AccountError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "invalid_credentials", message)
        }
        AccountError::Conflict => json_error(StatusCode::CONFLICT, "conflict", message),
        AccountError::Internal => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
        }
    }
}

pub fn gate_error_to_response(err: GateError) -> axum::response::Response {
    if err.is_forbidden() {
        json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
    } else {
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
            "code": code,
        })),
    )
        .into_response()
}
