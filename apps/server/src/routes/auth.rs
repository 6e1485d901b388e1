//! Admin registration and login.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;
use brandpos_core::validation::validate_credentials;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `POST /register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let (username, password) =
        validate_credentials(body.username.as_deref(), body.password.as_deref())?;

    let hash = hash_password(password)?;
    let admin = state.db.admins().create(username, &hash).await?;

    info!(admin_id = %admin.id, username = %admin.username, "Admin registered");
    Ok(Json(json!({ "message": "Admin has been registered" })))
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let (username, password) =
        validate_credentials(body.username.as_deref(), body.password.as_deref())?;

    let Some(admin) = state.db.admins().find_by_username(username).await? else {
        warn!(username, "Login for unknown admin");
        return Err(ApiError::invalid_credentials());
    };

    if !verify_password(password, &admin.password_hash) {
        warn!(username, "Login with wrong password");
        return Err(ApiError::invalid_credentials());
    }

    let token = state.jwt.issue(&admin.id, &admin.username)?;
    info!(admin_id = %admin.id, "Admin logged in");
    Ok(Json(json!({ "token": token })))
}
