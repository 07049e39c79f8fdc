use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, LogbookError>;

/// A payload that does not match the declared schema.
///
/// The message is surfaced to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message with the location it was raised at.
    pub fn context(self, location: impl std::fmt::Display) -> Self {
        ValidationError {
            message: format!("{}: {}", location, self.message),
        }
    }
}

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum LogbookError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl LogbookError {
    pub fn validation(message: impl Into<String>) -> Self {
        LogbookError::Validation(ValidationError::new(message))
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        LogbookError::PermissionDenied(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LogbookError::Validation(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, LogbookError::PermissionDenied(_))
    }
}
