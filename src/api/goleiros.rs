//! Goalkeeper API endpoints.

use axum::extract::{Path, State};
use axum::Json;

use super::{parse_id, Ack, ApiResult};
use crate::errors::AppError;
use crate::models::Goleiro;
use crate::AppState;

/// GET /api/goleiros - List all goalkeepers.
pub async fn list_goleiros(State(state): State<AppState>) -> ApiResult<Vec<Goleiro>> {
    let goleiros = state.repo.list_goleiros().await?;
    tracing::debug!(count = goleiros.len(), "Listed goleiros");
    Ok(Json(goleiros))
}

/// POST /api/goleiros/:id/toggle - Flip a goalkeeper between active and inactive.
pub async fn toggle_goleiro(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Ack, AppError> {
    let id = parse_id(&id)?;

    state.repo.toggle_goleiro_status(id).await?;
    tracing::info!(goleiro_id = id, "Toggled goleiro status");

    Ok(Ack::ok())
}
