use thiserror::Error;

/// The error taxonomy shared across the config repository, resolver, and
/// alert queue. Kinds map 1:1 onto the HTTP status codes the server surface
/// returns; `Timeout` and `Aborted` never escape past an internal boundary.
#[derive(Error, Debug)]
pub enum StreamForgeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StreamForgeError>;

impl StreamForgeError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {} not found", entity.into(), id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::Internal(message.to_string())
    }
}
