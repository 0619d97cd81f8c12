use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required form value is missing; carries the message shown to the user.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn validation(message: &str) -> Self { Self::Validation(message.to_string()) }
}
