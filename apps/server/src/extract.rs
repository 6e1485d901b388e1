//! Body and query extractors that fail with [`ApiError`].
//!
//! axum's own `Json` and `Query` reject with plain-text bodies. These
//! wrappers keep every 4xx in the `{ success, code, message }` shape.
//!
//! ```text
//! malformed JSON          ──► 400 VALIDATION_FAILED "Failed to parse the request body as JSON: ..."
//! wrong field type        ──► 400 VALIDATION_FAILED "Failed to deserialize the JSON body ..."
//! no JSON content type    ──► 400 VALIDATION_FAILED "Expected a JSON request body"
//! ?page=abc               ──► 400 VALIDATION_FAILED "Invalid query string: ..."
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use tracing::debug;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Rejected request body");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::validation("Expected a JSON request body")
            }
            other => ApiError::validation(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Rejected query string");
        ApiError::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}
