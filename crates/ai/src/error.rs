use thiserror::Error;

/// Failure raised by a prediction model.
///
/// Models never retry; the caller decides how to surface the error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    #[error("invalid model input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

impl AiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type AiResult<T> = Result<T, AiError>;
