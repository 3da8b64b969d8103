mod read;
mod types;
mod write;

/// Column list shared by every statement that returns whole posts.
const POST_COLUMNS: &str = "id, title, content, created_at, updated_at";
