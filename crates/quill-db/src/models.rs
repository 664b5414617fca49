/// Database row types — these map directly to SQLite rows.
/// Distinct from the quill-types API models to keep the DB layer independent.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: String,
    pub owner_id: i64,
}

/// A post joined with its owner and the count of vote rows referencing it.
/// Derived per query, never persisted.
#[derive(Debug)]
pub struct PostWithVotes {
    pub post: PostRow,
    pub owner_email: String,
    pub owner_created_at: String,
    pub votes: i64,
}
