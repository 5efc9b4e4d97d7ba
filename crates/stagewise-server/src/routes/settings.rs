use axum::extract::State;
use axum::Json;
use stagewise_core::settings::Settings;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/settings: the company resource pool.
pub async fn get_settings(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = app.with_store(|store| Ok(store.settings())).await?;
    Ok(Json(serde_json::to_value(settings)?))
}

/// PUT /api/settings: replace both totals; an omitted total becomes 0.
pub async fn put_settings(
    State(app): State<AppState>,
    Json(body): Json<Settings>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = app
        .with_store(move |store| store.replace_settings(body))
        .await?;
    tracing::info!(
        devops = settings.total_devops,
        engineers = settings.total_engineers,
        "settings updated"
    );
    Ok(Json(serde_json::to_value(settings)?))
}
