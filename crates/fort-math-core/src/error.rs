use thiserror::Error;

#[derive(Debug, Error)]
pub enum FortMathError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Overflow: {context} exceeds the 256-bit fixed-point range")]
    Overflow { context: String },

    #[error("Non-finite result in {context}")]
    NonFinite { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FortMathError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FortMathError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FortMathError {
    fn from(e: serde_json::Error) -> Self {
        FortMathError::SerializationError(e.to_string())
    }
}
