use axum::extract::{Path, State};
use axum::Json;
use stagewise_core::task::{NewTask, TaskPatch};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/tasks: add a task to a project stage. New tasks start as `todo`.
pub async fn create_task(
    State(app): State<AppState>,
    Json(body): Json<NewTask>,
) -> Result<Json<serde_json::Value>, AppError> {
    let task = app.with_store(move |store| store.create_task(body)).await?;
    tracing::info!(id = task.id, project_id = task.project_id, "task created");
    Ok(Json(serde_json::to_value(task)?))
}

/// PUT /api/tasks/:id: partial update.
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<TaskPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let task = app
        .with_store(move |store| store.update_task(id, body))
        .await?;
    tracing::info!(id, status = %task.status, "task updated");
    Ok(Json(serde_json::to_value(task)?))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_store(move |store| store.delete_task(id)).await?;
    tracing::info!(id, "task deleted");
    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}
