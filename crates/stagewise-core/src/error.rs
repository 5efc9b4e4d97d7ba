use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagewiseError {
    #[error("not initialized: run 'stagewise init'")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(u64),

    #[error("stage not found: {0}")]
    StageNotFound(u64),

    #[error("task not found: {0}")]
    TaskNotFound(u64),

    #[error("user not found: {0}")]
    UserNotFound(u64),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already exists: {0}")]
    UsernameTaken(String),

    #[error("invalid task status '{0}': expected todo, in_progress or done")]
    InvalidTaskStatus(String),

    #[error("invalid role '{0}': expected admin or viewer")]
    InvalidRole(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StagewiseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StagewiseError::Validation(msg.into())
    }

    /// True for every "no record with this id" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StagewiseError::ProjectNotFound(_)
                | StagewiseError::StageNotFound(_)
                | StagewiseError::TaskNotFound(_)
                | StagewiseError::UserNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StagewiseError>;
