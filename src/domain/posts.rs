//! Post field rules shared by create and update.

use super::error::DomainError;

pub const TITLE_MAX_CHARS: usize = 255;

/// Validated input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    /// Both fields are required; the title is capped at [`TITLE_MAX_CHARS`].
    pub fn parse(title: Option<String>, content: Option<String>) -> Result<Self, DomainError> {
        let title = required(title, "title")?;
        ensure_title_length(&title)?;
        let content = required(content, "content")?;
        Ok(Self { title, content })
    }
}

/// Validated partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// Supplied fields must satisfy the same rules as [`NewPost::parse`].
    pub fn parse(title: Option<String>, content: Option<String>) -> Result<Self, DomainError> {
        let title = title.map(|value| required(Some(value), "title")).transpose()?;
        if let Some(title) = title.as_deref() {
            ensure_title_length(title)?;
        }
        let content = content
            .map(|value| required(Some(value), "content"))
            .transpose()?;
        Ok(Self { title, content })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, DomainError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DomainError::required(field)),
    }
}

fn ensure_title_length(title: &str) -> Result<(), DomainError> {
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::too_long("title", TITLE_MAX_CHARS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: DomainError) -> String {
        err.to_string()
    }

    #[test]
    fn new_post_requires_both_fields() {
        let err = NewPost::parse(None, Some("body".into())).unwrap_err();
        assert_eq!(message(err), "The title field is required.");

        let err = NewPost::parse(Some("title".into()), Some("   ".into())).unwrap_err();
        assert_eq!(message(err), "The content field is required.");
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let exactly = "é".repeat(TITLE_MAX_CHARS);
        assert!(NewPost::parse(Some(exactly), Some("body".into())).is_ok());

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        let err = NewPost::parse(Some(over), Some("body".into())).unwrap_err();
        assert_eq!(
            message(err),
            "The title field must not be greater than 255 characters."
        );
    }

    #[test]
    fn patch_accepts_absent_fields() {
        let patch = PostPatch::parse(None, None).expect("empty patch");
        assert!(patch.is_empty());

        let patch = PostPatch::parse(Some("X".into()), None).expect("title only");
        assert_eq!(patch.title.as_deref(), Some("X"));
        assert!(patch.content.is_none());
    }

    #[test]
    fn patch_rejects_blank_supplied_fields() {
        let err = PostPatch::parse(Some("".into()), None).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));

        let err = PostPatch::parse(None, Some(" ".into())).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "content",
                ..
            }
        ));
    }
}
