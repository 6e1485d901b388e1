//! Catalog management.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;
use brandpos_core::validation::{validate_stock, BrandInput, BrandPatch};
use brandpos_core::{Brand, CoreError};

#[derive(Debug, Deserialize)]
pub struct RestockBody {
    pub stock: Option<f64>,
}

/// `GET /brands`
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Brand>>, ApiError> {
    Ok(Json(state.db.brands().list().await?))
}

/// `POST /brands`
pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<BrandInput>,
) -> Result<Json<Brand>, ApiError> {
    let new_brand = body.validate()?;
    let brand = state.db.brands().insert(&new_brand).await?;

    info!(brand_id = %brand.id, name = %brand.name, stock = brand.stock, "Brand added");
    Ok(Json(brand))
}

/// `PUT /brands/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BrandPatch>,
) -> Result<Json<Brand>, ApiError> {
    let update = body.validate()?;
    if update.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let brand = state.db.brands().update(&id, &update).await?;
    info!(brand_id = %brand.id, restocked = update.restocks(), "Brand updated");
    Ok(Json(brand))
}

/// `PUT /brands/{id}/restock`
pub async fn restock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RestockBody>,
) -> Result<Json<Brand>, ApiError> {
    let stock = body.stock.ok_or_else(|| CoreError::missing(["stock"]))?;
    let stock = validate_stock(stock)?;

    let brand = state.db.brands().restock(&id, stock).await?;
    info!(brand_id = %brand.id, stock = brand.stock, "Brand restocked");
    Ok(Json(brand))
}

/// `DELETE /brands/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.brands().delete(&id).await?;

    info!(brand_id = %id, "Brand deleted");
    Ok(Json(json!({ "message": "Brand deleted" })))
}
