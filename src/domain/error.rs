use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain entity `{entity}` not found")]
    NotFound { entity: &'static str },
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::validation(field, format!("The {field} field is required."))
    }

    pub fn too_long(field: &'static str, max: usize) -> Self {
        Self::validation(
            field,
            format!("The {field} field must not be greater than {max} characters."),
        )
    }
}
