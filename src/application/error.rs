use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::repos::RepoError, cache::CacheError, domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic detail carried on error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// How a failure is reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub const POST_NOT_FOUND: &str = "Post not found.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn post_not_found() -> Self {
        Self::Domain(DomainError::not_found("post"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) | AppError::Repo(RepoError::NotFound) => {
                ErrorKind::NotFound
            }
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Cache(CacheError::MissingKey) => ErrorKind::Validation,
            AppError::Repo(_)
            | AppError::Cache(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status()
    }

    /// Message safe to show to clients. Internal detail stays in the [`ErrorReport`].
    pub fn public_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Validation { message, .. }) => message.clone(),
            AppError::Cache(CacheError::MissingKey) => CacheError::MissingKey.to_string(),
            _ => match self.kind() {
                ErrorKind::NotFound => POST_NOT_FOUND.to_string(),
                _ => INTERNAL_ERROR.to_string(),
            },
        }
    }
}
