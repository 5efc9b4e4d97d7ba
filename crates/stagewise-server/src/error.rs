use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use stagewise_core::error::StagewiseError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StagewiseError::Validation(msg.into()).into())
    }
}

fn status_for(err: &StagewiseError) -> StatusCode {
    match err {
        StagewiseError::ProjectNotFound(_)
        | StagewiseError::StageNotFound(_)
        | StagewiseError::TaskNotFound(_)
        | StagewiseError::UserNotFound(_) => StatusCode::NOT_FOUND,
        StagewiseError::NotInitialized
        | StagewiseError::Validation(_)
        | StagewiseError::UsernameTaken(_)
        | StagewiseError::InvalidTaskStatus(_)
        | StagewiseError::InvalidRole(_) => StatusCode::BAD_REQUEST,
        StagewiseError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StagewiseError::Io(_) | StagewiseError::Yaml(_) | StagewiseError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<StagewiseError>()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, status_for);

        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn status(err: StagewiseError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn missing_records_map_to_404() {
        assert_eq!(status(StagewiseError::ProjectNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status(StagewiseError::StageNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status(StagewiseError::TaskNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status(StagewiseError::UserNotFound(1)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status(StagewiseError::validation("percentages")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::bad_request("bad week").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn duplicate_username_maps_to_400() {
        assert_eq!(
            status(StagewiseError::UsernameTaken("admin".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn bad_credentials_map_to_401() {
        assert_eq!(status(StagewiseError::InvalidCredentials), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_initialized_maps_to_400() {
        assert_eq!(status(StagewiseError::NotInitialized), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        assert_eq!(status(StagewiseError::Io(io_err)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(StagewiseError::ProjectNotFound(3).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
