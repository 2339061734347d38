//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and service wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: response envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use stockroom_core::StoreError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails only if the configured store cannot be reached.
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config).await?);
    let auth_state = middleware::AuthState {
        authenticator: services.authenticator.clone(),
    };

    // Protected routes: the middleware only runs for matched routes, so
    // unknown paths still fall through to the 404 handler.
    let protected = routes::protected_router()
        .route_layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    let api = routes::public_router()
        .merge(protected)
        .layer(Extension(services));

    Ok(Router::new()
        .nest("/api", api)
        .fallback(errors::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
}
