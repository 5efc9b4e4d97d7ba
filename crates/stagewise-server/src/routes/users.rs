use axum::extract::{Path, State};
use axum::Json;
use stagewise_core::user::{Credentials, NewUser, UserPatch};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/login: exact credential match; returns the user without password.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<serde_json::Value>, AppError> {
    let username = body.username.clone();
    let user = app
        .with_store(move |store| store.login(&body))
        .await
        .inspect_err(|_| tracing::warn!(%username, "login rejected"))?;
    Ok(Json(serde_json::to_value(user)?))
}

/// GET /api/users: every account, passwords omitted.
pub async fn list_users(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let users = app.with_store(|store| Ok(store.users())).await?;
    Ok(Json(serde_json::to_value(users)?))
}

/// POST /api/users
pub async fn create_user(
    State(app): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = app.with_store(move |store| store.create_user(body)).await?;
    tracing::info!(id = user.id, username = %user.username, role = %user.role, "user created");
    Ok(Json(serde_json::to_value(user)?))
}

/// PUT /api/users/:id: blank fields, including the password, are left unchanged.
pub async fn update_user(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<UserPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = app
        .with_store(move |store| store.update_user(id, &body))
        .await?;
    tracing::info!(id, "user updated");
    Ok(Json(serde_json::to_value(user)?))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.with_store(move |store| store.delete_user(id)).await?;
    tracing::info!(id, "user deleted");
    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}
