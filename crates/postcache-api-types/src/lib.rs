//! Wire types for the postcache JSON API.
//!
//! Enveloped responses share one shape, `{message, data, code}`, where `code`
//! mirrors the HTTP status. `show` and `search` answer with raw bodies instead;
//! their not-found case uses [`RawError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
    pub code: u16,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T, code: u16) -> Self {
        Self {
            message: message.into(),
            data,
            code,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(message, data, 200)
    }
}

impl Envelope<Value> {
    /// Envelope carrying an empty `data` array, used for failures and deletes.
    pub fn empty(message: impl Into<String>, code: u16) -> Self {
        Self::new(message, Value::Array(Vec::new()), code)
    }
}

/// Body used by raw (non-enveloped) routes when they fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawError {
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostCreateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Partial update; absent and `null` fields are both left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheKeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_envelope_serializes_empty_array() {
        let envelope = Envelope::empty("Post not found.", 404);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "message": "Post not found.", "data": [], "code": 404 })
        );
    }

    #[test]
    fn update_request_treats_null_as_absent() {
        let parsed: PostUpdateRequest =
            serde_json::from_value(json!({ "title": null, "content": "body" })).unwrap();
        assert!(parsed.title.is_none());
        assert_eq!(parsed.content.as_deref(), Some("body"));
    }
}
