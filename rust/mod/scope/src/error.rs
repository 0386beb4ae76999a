use thiserror::Error;

/// Scope service error type.
///
/// Only the collaborator boundary (directory loads, configuration) produces
/// these. Decision functions resolve every data-quality condition to a
/// fallback value instead of failing.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("serialization: {0}")]
    Serialization(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ScopeError {
    fn from(e: serde_json::Error) -> Self {
        ScopeError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ScopeError {
    fn from(e: std::io::Error) -> Self {
        ScopeError::Storage(e.to_string())
    }
}
