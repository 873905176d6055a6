use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {message}")]
    Storage { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("invalid prefix: {literal}")]
    InvalidPrefix { literal: String },
}

impl StoreError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_prefix(literal: impl Into<String>) -> Self {
        Self::InvalidPrefix {
            literal: literal.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
