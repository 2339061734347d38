use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    response::Response,
    routing::{post, put},
    Extension, Json, Router,
};

use stockroom_auth::Principal;
use stockroom_catalog::{CategoryListParams, CreateCategory, UpdateCategory};
use stockroom_core::CategoryId;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::routes::{blocking, path_id};
use crate::app::services::AppServices;

const INVALID_ID: &str = "Invalid category ID";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_category).get(list_categories))
        .route("/:id", put(update_category).delete(delete_category))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateCategory>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body?;
    let category = blocking(move || services.categories.create(&principal, input)).await?;
    Ok(dto::created(category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<CategoryListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let categories = blocking(move || services.categories.list(&principal, params)).await?;
    Ok(dto::ok(categories))
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCategory>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: CategoryId = path_id(&id, INVALID_ID)?;
    let Json(patch) = body?;
    let category = blocking(move || services.categories.update(&principal, id, patch)).await?;
    Ok(dto::ok(category))
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CategoryId = path_id(&id, INVALID_ID)?;
    blocking(move || services.categories.delete(&principal, id)).await?;
    Ok(dto::message("Category deleted successfully"))
}
