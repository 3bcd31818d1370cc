use serde::Serialize;

/// Errors raised inside the forecasting engine.
///
/// Most of the engine never fails: unknown crops fall back to default tables and
/// short series are skipped. These variants cover malformed caller input.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Short machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}
