use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Network,
    Validation,
    NotFound,
    Internal,
}

/// Error body a backend may attach to a non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Classed failure from any backend call: transport trouble, server-side
/// validation, a missing record, or anything else the backend rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct BackendError {
    pub code: ErrorCode,
    pub message: String,
}

impl BackendError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl From<ApiError> for BackendError {
    fn from(value: ApiError) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_snake_case() {
        let body = serde_json::to_string(&ApiError::new(ErrorCode::NotFound, "course 7 not found"))
            .expect("serialize");
        assert_eq!(body, r#"{"code":"not_found","message":"course 7 not found"}"#);
    }

    #[test]
    fn wire_error_converts_to_backend_error() {
        let api = ApiError::new(ErrorCode::Validation, "name must not be empty");
        let err = BackendError::from(api);
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.to_string(), "Validation: name must not be empty");
    }
}
