use thiserror::Error;

pub mod api;
pub mod utils;

/// Failures below the HTTP status level: the request never got an answer,
/// or the answer was not JSON.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}
