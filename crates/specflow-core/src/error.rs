use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecflowError {
    #[error("not set up: run 'specflow setup'")]
    NotInitialized,

    #[error("invalid spec name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSpecName(String),

    #[error("no tasks document for spec '{0}'")]
    TasksNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpecflowError>;
