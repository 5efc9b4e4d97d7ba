use axum::extract::{Path, State};
use axum::Json;
use stagewise_core::project::StagePatch;

use crate::error::AppError;
use crate::state::AppState;

/// PUT /api/stages/:id: update progress and/or assigned resources.
pub async fn update_stage(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<StagePatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stage = app
        .with_store(move |store| store.update_stage(id, &body))
        .await?;
    tracing::info!(
        id,
        progress = stage.progress,
        devops = stage.devops,
        engineers = stage.engineers,
        "stage updated"
    );
    Ok(Json(serde_json::to_value(stage)?))
}
