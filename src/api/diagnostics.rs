//! Diagnostic endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::db::{run_diagnostics, DiagnosticsReport};
use crate::AppState;

/// GET /api/test-db - Check connectivity on a dedicated connection.
pub async fn test_db(State(state): State<AppState>) -> (StatusCode, Json<DiagnosticsReport>) {
    let report = run_diagnostics(&state.config.database).await;

    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}
