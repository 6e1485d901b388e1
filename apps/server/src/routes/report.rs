//! Report and export.
//!
//! Both routes take the same query string. Only an unusable period is an
//! input error; anything else that goes wrong is logged and reported as
//! "Failed to generate report".

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::AppState;
use brandpos_core::export::{format_report, ExportFormat};
use brandpos_core::report::{build_report, Report, ReportFilter, ReportQuery};
use brandpos_core::SaleView;

const REPORT_FAILED: &str = "Failed to generate report";

async fn select(
    state: &AppState,
    query: &ReportQuery,
) -> Result<(ReportFilter, Vec<SaleView>), ApiError> {
    let filter = query.filter(Utc::now())?;

    let sales = state.db.sales().find(&filter).await.map_err(|e| {
        error!(error = %e, "Report query failed");
        ApiError::internal(REPORT_FAILED)
    })?;

    Ok((filter, sales))
}

/// `GET /sales/advanced-report`
pub async fn report(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<Json<Report>, ApiError> {
    let (filter, sales) = select(&state, &query).await?;
    let report = build_report(sales);

    info!(
        period = filter.period.as_str(),
        sales = report.summary.total_sales,
        "Report built"
    );
    Ok(Json(report))
}

/// `GET /sales/advanced-report/download?format=csv|excel`
pub async fn download(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Result<Response, ApiError> {
    let (filter, sales) = select(&state, &query).await?;
    let format = ExportFormat::parse(query.format.as_deref());

    let file = format_report(&sales, format, filter.period.as_str(), Utc::now().date_naive())
        .map_err(|e| {
            error!(error = %e, "Export failed");
            ApiError::internal(REPORT_FAILED)
        })?;

    info!(
        filename = %file.filename,
        rows = sales.len(),
        bytes = file.bytes.len(),
        "Report exported"
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response())
}
