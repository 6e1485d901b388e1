//! # Brand POS Server
//!
//! HTTP API consumed by the browser dashboard.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Route Table                                  │
//! │                                                                         │
//! │  Auth         POST /register                 POST /login               │
//! │                                                                         │
//! │  Catalog      GET  /brands                   POST /brands              │
//! │               PUT  /brands/{id}              DELETE /brands/{id}       │
//! │               PUT  /brands/{id}/restock                                │
//! │                                                                         │
//! │  Sales  🔒    POST /sales                    POST /sales/bulk          │
//! │               POST /sales/checkout                                     │
//! │               GET  /sales?page=&limit=                                 │
//! │                                                                         │
//! │  Reports      GET  /sales/advanced-report                              │
//! │               GET  /sales/advanced-report/download                     │
//! │                                                                         │
//! │  Ops          GET  /health                                             │
//! │                                                                         │
//! │  🔒 = POST routes require `Authorization: Bearer <token>`              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`]. Environment variables:
//! - `BRANDPOS_PORT` - listen port (default: 3500)
//! - `BRANDPOS_DATABASE_PATH` - SQLite file (default: ./brandpos.db)
//! - `BRANDPOS_JWT_SECRET` - secret for signing admin tokens
//! - `BRANDPOS_JWT_LIFETIME_SECS` - token lifetime (default: 3600)
//! - `BRANDPOS_CORS_ORIGIN` - dashboard origin (default: http://localhost:3000)
//! - `BRANDPOS_DEFAULT_PAGE_SIZE` - sales listing page size (default: 20)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use brandpos_db::Database;

// Re-exports
pub use auth::JwtManager;
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);
        AppState { db, jwt, config }
    }
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route(
            "/brands",
            get(routes::brand::list).post(routes::brand::create),
        )
        .route(
            "/brands/{id}",
            put(routes::brand::update).delete(routes::brand::delete),
        )
        .route("/brands/{id}/restock", put(routes::brand::restock))
        .route(
            "/sales",
            get(routes::sale::list).post(routes::sale::record),
        )
        .route("/sales/bulk", post(routes::sale::record_bulk))
        .route("/sales/checkout", post(routes::sale::checkout))
        .route("/sales/advanced-report", get(routes::report::report))
        .route(
            "/sales/advanced-report/download",
            get(routes::report::download),
        )
        .route("/health", get(routes::health))
        .layer(middleware::from_fn(log_request))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-site"),
        ))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin, "Unusable CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// Logs method, path, status and latency. Bodies are never logged.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
