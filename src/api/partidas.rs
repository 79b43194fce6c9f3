//! Match API endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use super::{parse_id, Ack, ApiResult};
use crate::errors::AppError;
use crate::models::{AssignRequest, Partida};
use crate::AppState;

/// GET /api/partidas - List all matches.
pub async fn list_partidas(State(state): State<AppState>) -> ApiResult<Vec<Partida>> {
    let partidas = state.repo.list_partidas().await?;
    tracing::debug!(count = partidas.len(), "Listed partidas");
    Ok(Json(partidas))
}

/// POST /api/partidas/:id/assign - Assign a goalkeeper and confirm the match.
///
/// The body is read raw so a missing content type is not an error.
pub async fn assign_goleiro(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Ack, AppError> {
    let partida_id = parse_id(&id)?;
    let request = AssignRequest::parse(&body)
        .ok_or_else(|| AppError::Validation("Invalid goleiroId".to_string()))?;

    state
        .repo
        .assign_goleiro(partida_id, request.goleiro_id)
        .await?;
    tracing::info!(partida_id, goleiro_id = request.goleiro_id, "Assigned goleiro");

    Ok(Ack::ok())
}
