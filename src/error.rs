use thiserror::Error;

/// Errors that can occur while reading or writing recipe data
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Input failed validation before anything was persisted
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    /// A referenced record does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// The acting user may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation would duplicate or remove a relation in the wrong state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Image payload could not be decoded
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl RecipeError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RecipeError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        RecipeError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T, E = RecipeError> = std::result::Result<T, E>;
