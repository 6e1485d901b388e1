//! Sale recording and listing.
//!
//! ## Bulk Responses
//! ```text
//! all recorded   → 201 { success: true,  message: "3 sales recorded successfully",
//!                        data: [RecordedSale, ...] }
//!
//! stopped at i   → 400 { success: false, message: "Failed to process sale at index i",
//!                        code, error, saleIndex: i,
//!                        data: [RecordedSale, ...]    // items before i, committed }
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::AuthAdmin;
use crate::error::{ApiError, ErrorCode};
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;
use brandpos_core::checkout::Cart;
use brandpos_core::validation::{Page, PageParams};
use brandpos_core::{BulkOutcome, FailureKind, SalesPage};

/// `POST /sales`
pub async fn record(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let recorded = state.db.recorder().record_json(&body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Sale recorded successfully",
            "data": recorded,
        })),
    )
        .into_response())
}

/// `POST /sales/bulk` with body `{ "sales": [ ... ] }`
pub async fn record_bulk(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    let items = body
        .get("sales")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::validation("Request body must contain a sales array"))?;

    let outcome = state.db.recorder().record_bulk(items).await?;
    Ok(bulk_response(outcome))
}

/// `POST /sales/checkout` with a cart of lines and one amount received
pub async fn checkout(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(cart): ApiJson<Cart>,
) -> Result<Response, ApiError> {
    let outcome = state.db.recorder().record_checkout(&cart).await?;
    Ok(bulk_response(outcome))
}

fn bulk_response(outcome: BulkOutcome) -> Response {
    match outcome.failure {
        None => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": format!("{} sales recorded successfully", outcome.sales.len()),
                "data": outcome.sales,
            })),
        )
            .into_response(),
        Some(failure) => {
            let status = match failure.kind {
                FailureKind::TransactionAborted => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            (
                status,
                Json(json!({
                    "success": false,
                    "code": ErrorCode::from(failure.kind),
                    "message": format!("Failed to process sale at index {}", failure.index),
                    "error": failure.message,
                    "saleIndex": failure.index,
                    "data": outcome.sales,
                })),
            )
                .into_response()
        }
    }
}

/// `GET /sales?page=&limit=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<SalesPage>, ApiError> {
    let page = Page::resolve(params, state.config.default_page_size);
    Ok(Json(state.db.sales().list_page(page).await?))
}
