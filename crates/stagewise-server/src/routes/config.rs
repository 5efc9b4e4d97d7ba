use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config: the loaded `.stagewise/config.yaml` plus validation
/// warnings. Read-only; edit the file and restart to change it.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let warnings = app.config.validate();
    Ok(Json(serde_json::json!({
        "config": &*app.config,
        "warnings": warnings,
    })))
}
