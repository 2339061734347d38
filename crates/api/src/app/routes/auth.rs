use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, response::Response, Extension, Json};

use stockroom_auth::{Credentials, Principal, Registration};

use crate::app::dto::{self, ProfileResponse};
use crate::app::errors::ApiError;
use crate::app::routes::blocking;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(registration) = body?;
    let authenticator = services.authenticator.clone();
    let session = blocking(move || authenticator.register(registration)).await?;
    Ok(dto::created(session))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = body?;
    let authenticator = services.authenticator.clone();
    let session = blocking(move || authenticator.login(credentials)).await?;
    Ok(dto::ok(session))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Response, ApiError> {
    let user = blocking(move || services.authenticator.profile(&principal)).await?;
    Ok(dto::ok(ProfileResponse { user }))
}
