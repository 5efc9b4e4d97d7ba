use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use stagewise_core::report::WeeklyReport;
use stagewise_core::types::parse_date;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ReportQuery {
    /// Any date inside the wanted week; defaults to the current week.
    pub week: Option<String>,
}

impl ReportQuery {
    fn week_of(&self, today: NaiveDate) -> Result<NaiveDate, AppError> {
        match self.week.as_deref().map(str::trim) {
            None | Some("") => Ok(today),
            Some(raw) => parse_date(raw)
                .map_err(|e| AppError::bad_request(format!("invalid week '{raw}': {e}"))),
        }
    }
}

async fn build(app: &AppState, query: &ReportQuery) -> Result<WeeklyReport, AppError> {
    let today = app.today();
    let week_of = query.week_of(today)?;
    app.with_store(move |store| {
        Ok(WeeklyReport::build(
            &store.project_views(),
            &store.settings(),
            week_of,
            today,
        ))
    })
    .await
}

/// GET /api/report?week=YYYY-MM-DD: the weekly report as JSON.
pub async fn get_report(
    State(app): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = build(&app, &query).await?;
    Ok(Json(serde_json::to_value(report)?))
}

/// GET /api/report/export?week=YYYY-MM-DD: plain-text download.
pub async fn export_report(
    State(app): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = build(&app, &query).await?;
    let text = report.render_text(app.now());
    tracing::info!(week = %report.week_start, "report exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name()),
            ),
        ],
        text,
    ))
}
