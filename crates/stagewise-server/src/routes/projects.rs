use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use stagewise_core::project::{NewProject, ProjectPatch};
use stagewise_core::task::build_board;
use stagewise_core::timeline::ProjectCalendar;
use stagewise_core::types::optional_date;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/projects: every project with nested stages and tasks.
pub async fn list_projects(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_store(|store| Ok(serde_json::to_value(store.project_views())?))
        .await?;
    Ok(Json(result))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_store(move |store| Ok(serde_json::to_value(store.project_view(id)?)?))
        .await?;
    Ok(Json(result))
}

/// POST /api/projects: create a project and its stages.
pub async fn create_project(
    State(app): State<AppState>,
    Json(body): Json<NewProject>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = app.with_store(move |store| store.create_project(body)).await?;
    tracing::info!(id = view.project.id, name = %view.project.name, "project created");
    Ok(Json(serde_json::to_value(view)?))
}

/// PUT /api/projects/:id: partial update; `stages` replaces the stage list.
pub async fn update_project(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<ProjectPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = app
        .with_store(move |store| store.update_project(id, body))
        .await?;
    tracing::info!(id, "project updated");
    Ok(Json(serde_json::to_value(view)?))
}

/// DELETE /api/projects/:id: removes the project, its stages and its tasks.
pub async fn delete_project(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_store(move |store| store.delete_project(id)).await?;
    tracing::info!(id, "project deleted");
    Ok(Json(serde_json::json!({ "message": "Project deleted" })))
}

#[derive(serde::Deserialize)]
pub struct StartBody {
    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,
}

/// POST /api/projects/:id/start: schedule a planning project from a start date.
pub async fn start_project(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<StartBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let start = body
        .start_date
        .ok_or_else(|| AppError::bad_request("start_date is required"))?;
    let view = app
        .with_store(move |store| store.start_project(id, start))
        .await?;
    tracing::info!(id, %start, "project started");
    Ok(Json(serde_json::to_value(view)?))
}

/// GET /api/projects/:id/timeline: calendar insights for one project.
pub async fn get_timeline(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = app
        .with_store(move |store| {
            let view = store.project_view(id)?;
            Ok(serde_json::to_value(ProjectCalendar::build(&view, today))?)
        })
        .await?;
    Ok(Json(result))
}

/// GET /api/projects/:id/board: kanban columns, one per stage.
pub async fn get_board(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = app
        .with_store(move |store| {
            let view = store.project_view(id)?;
            Ok(serde_json::json!({
                "project_id": id,
                "columns": build_board(&view),
            }))
        })
        .await?;
    Ok(Json(result))
}
