use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};

use stockroom_auth::Principal;
use stockroom_catalog::{CreateProduct, ProductListParams, UpdateProduct};
use stockroom_core::ProductId;

use crate::app::dto::{self, ProductPageResponse};
use crate::app::errors::ApiError;
use crate::app::routes::{blocking, path_id};
use crate::app::services::AppServices;

const INVALID_ID: &str = "Invalid product ID";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body?;
    let product = blocking(move || services.products.create(&principal, input)).await?;
    Ok(dto::created(product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<ProductListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let page = blocking(move || services.products.list(&principal, params)).await?;
    Ok(dto::ok(ProductPageResponse::from(page)))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: ProductId = path_id(&id, INVALID_ID)?;
    let product = blocking(move || services.products.get(&principal, id)).await?;
    Ok(dto::ok(product))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: ProductId = path_id(&id, INVALID_ID)?;
    let Json(patch) = body?;
    let product = blocking(move || services.products.update(&principal, id, patch)).await?;
    Ok(dto::ok(product))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: ProductId = path_id(&id, INVALID_ID)?;
    blocking(move || services.products.delete(&principal, id)).await?;
    Ok(dto::message("Product deleted successfully"))
}
