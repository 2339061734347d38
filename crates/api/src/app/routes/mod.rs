use std::str::FromStr;

use axum::{
    routing::{get, post},
    Router,
};

use stockroom_core::DomainError;

use crate::app::errors::{self, ApiError};

pub mod auth;
pub mod categories;
pub mod products;
pub mod system;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .method_not_allowed_fallback(errors::method_not_allowed)
}

/// Endpoints behind the auth middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .method_not_allowed_fallback(errors::method_not_allowed)
}

/// Parse a path id; failures are reported as a validation error on `id`.
pub(crate) fn path_id<T: FromStr>(raw: &str, message: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ApiError(DomainError::validation("id", message)))
}

/// Run service work on the blocking pool.
///
/// Password hashing and store round-trips both block the calling thread.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError(DomainError::internal(format!("blocking task failed: {e}"))))?
        .map_err(ApiError)
}
