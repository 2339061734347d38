use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use stockroom_auth::Authenticator;

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

/// Verify the bearer token and attach the request's `Principal`.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = state.authenticator.authenticate_request(header, Utc::now())?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
