use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidSelector,
    Detached,
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct HostException {
    pub code: ErrorCode,
    pub message: String,
}

impl HostException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
