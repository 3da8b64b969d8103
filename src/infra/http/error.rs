use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postcache_api_types::{Envelope, RawError};

use crate::application::error::{AppError, ErrorKind, ErrorReport};

/// Body layout of an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{message, data: [], code}`
    Envelope,
    /// `{error}`, for routes that answer with raw bodies.
    Raw,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    body: ErrorBody,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            body: ErrorBody::Envelope,
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn from_app(source: &'static str, err: AppError) -> Self {
        let status = err.status_code();
        Self {
            status,
            message: err.public_message(),
            body: ErrorBody::Envelope,
            report: ErrorReport::from_error(source, status, &err),
        }
    }

    pub fn validation(
        source: &'static str,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(source, ErrorKind::Validation.status(), message, detail)
    }

    pub fn not_found(source: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(source, StatusCode::NOT_FOUND, message.clone(), message)
    }

    /// Render as `{error}` instead of the envelope.
    pub fn raw(mut self) -> Self {
        self.body = ErrorBody::Raw;
        self
    }

    /// Replace the client-facing message, keeping status and diagnostics.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            ErrorBody::Envelope => (
                self.status,
                Json(Envelope::empty(self.message, self.status.as_u16())),
            )
                .into_response(),
            ErrorBody::Raw => (
                self.status,
                Json(RawError {
                    error: self.message,
                }),
            )
                .into_response(),
        };
        self.report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn envelope_mode_mirrors_status_in_code() {
        let err = ApiError::from_app("test", AppError::from(DomainError::required("title")));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.extensions().get::<ErrorReport>().is_some());
        assert_eq!(
            body_json(response).await,
            json!({ "message": "The title field is required.", "data": [], "code": 422 })
        );
    }

    #[tokio::test]
    async fn raw_mode_uses_error_field() {
        let err = ApiError::from_app("test", AppError::post_not_found())
            .raw()
            .with_message("Post not found");
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Post not found" }));
    }
}
