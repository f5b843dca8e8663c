use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlaError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Notification error: {0}")]
    Notification(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type SlaResult<T> = Result<T, SlaError>;
