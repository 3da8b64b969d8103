//! Cache key definitions.
//!
//! Two key families are populated by the service: the whole-collection key
//! [`ALL_POSTS_KEY`] and one `post::<id>` key per single-post read. Clients may
//! name any other key through the cache endpoints.

use super::store::CacheError;

/// Key under which the full post list is cached.
pub const ALL_POSTS_KEY: &str = "all_post";

const POST_KEY_PREFIX: &str = "post::";

/// Key for a single cached post.
pub fn post_key(id: i64) -> String {
    format!("{POST_KEY_PREFIX}{id}")
}

/// Coarse grouping of keys, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    AllPosts,
    Post,
    Other,
}

impl KeyFamily {
    pub fn of(key: &str) -> Self {
        if key == ALL_POSTS_KEY {
            Self::AllPosts
        } else if key.starts_with(POST_KEY_PREFIX) {
            Self::Post
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllPosts => "all_post",
            Self::Post => "post",
            Self::Other => "other",
        }
    }
}

/// Accept a client-supplied key as given. Absent or blank keys are rejected.
pub fn require_key(raw: Option<&str>) -> Result<String, CacheError> {
    match raw {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => Err(CacheError::MissingKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_key_uses_double_colon_prefix() {
        assert_eq!(post_key(42), "post::42");
    }

    #[test]
    fn families_are_detected_from_keys() {
        assert_eq!(KeyFamily::of("all_post"), KeyFamily::AllPosts);
        assert_eq!(KeyFamily::of(&post_key(7)), KeyFamily::Post);
        assert_eq!(KeyFamily::of("all_posts"), KeyFamily::Other);
    }

    #[test]
    fn blank_keys_are_missing() {
        assert!(matches!(require_key(None), Err(CacheError::MissingKey)));
        assert!(matches!(require_key(Some("  ")), Err(CacheError::MissingKey)));
        assert_eq!(require_key(Some("all_post")).unwrap(), "all_post");
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_key() {
        assert_eq!(require_key(Some(" all_post ")).unwrap(), " all_post ");
    }
}
