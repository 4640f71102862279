//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid value '{value}' for {variable}: {reason}")]
    MalformedValue {
        variable: String,
        value: String,
        reason: String,
    },

    #[error("failed to serialize config: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn malformed(
        variable: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::MalformedValue {
            variable: variable.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
