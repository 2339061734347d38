//! Response envelopes: `{success, data?, message?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use stockroom_auth::UserProfile;
use stockroom_catalog::{Page, Pagination, ProductView};

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(json!({ "success": true, "data": data }))).into_response()
}

pub fn message(message: &str) -> Response {
    Json(json!({ "success": true, "message": message })).into_response()
}

/// `GET /auth/me` payload.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// `GET /products` payload.
#[derive(Debug, Serialize)]
pub struct ProductPageResponse {
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
}

impl From<Page<ProductView>> for ProductPageResponse {
    fn from(page: Page<ProductView>) -> Self {
        Self {
            products: page.items,
            pagination: page.pagination,
        }
    }
}
