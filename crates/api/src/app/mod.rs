//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account service wiring (store, codec, hasher)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Router};

use harvestgate_auth::{Hs256TokenCodec, TokenCodec};

use crate::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Mount point of the account API.
pub const API_PREFIX: &str = "/api/users";

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Router {
    let codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::with_ttl(
        config.jwt_secret.clone(),
        config.token_ttl,
    ));
    let services = Arc::new(services::AppServices::in_memory(codec.clone()));

    build_app_with(services, codec)
}

/// Build the router around already-wired services (tests inject their own).
pub fn build_app_with(services: Arc<services::AppServices>, codec: Arc<dyn TokenCodec>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest(API_PREFIX, routes::router(services, codec))
}
