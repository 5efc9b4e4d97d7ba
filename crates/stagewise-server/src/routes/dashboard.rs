use axum::extract::State;
use axum::Json;
use stagewise_core::dashboard::Dashboard;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/dashboard: portfolio summary, resource ledger and health counts.
pub async fn get_dashboard(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = app
        .with_store(move |store| {
            let dashboard = Dashboard::build(&store.project_views(), &store.settings(), today);
            Ok(serde_json::to_value(dashboard)?)
        })
        .await?;
    Ok(Json(result))
}
