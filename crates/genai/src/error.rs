use thiserror::Error;

/// Why a flow invocation produced no result. A failed call never yields a
/// partially filled response.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input field `{field}`: {reason}")]
    Validation { field: String, reason: String },
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("generated output does not match schema at `{field}`: {reason}")]
    SchemaMismatch { field: String, reason: String },
}

impl FlowError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn mismatch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}
