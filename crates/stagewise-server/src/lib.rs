pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use state::AppState;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/start",
            post(routes::projects::start_project),
        )
        .route(
            "/api/projects/{id}/timeline",
            get(routes::projects::get_timeline),
        )
        .route("/api/projects/{id}/board", get(routes::projects::get_board))
        // Tasks
        .route("/api/tasks", post(routes::tasks::create_task))
        .route(
            "/api/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        // Stages
        .route("/api/stages/{id}", put(routes::stages::update_stage))
        // Settings
        .route(
            "/api/settings",
            get(routes::settings::get_settings).put(routes::settings::put_settings),
        )
        // Auth and users
        .route("/api/login", post(routes::users::login))
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/{id}",
            put(routes::users::update_user).delete(routes::users::delete_user),
        )
        // Views
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route("/api/report", get(routes::report::get_report))
        .route("/api/report/export", get(routes::report::export_report))
        // Config
        .route("/api/config", get(routes::config::get_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Open the tracker at `root` and serve it on `host:port` until the future
/// is dropped.
pub async fn serve(root: &Path, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(root, listener).await
}

/// Serve on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(root: &Path, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app_state = {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || AppState::open(&root)).await??
    };
    for warning in app_state.config.validate() {
        tracing::warn!(level = ?warning.level, "{}", warning.message);
    }
    let app = build_router(app_state);

    tracing::info!("stagewise server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
