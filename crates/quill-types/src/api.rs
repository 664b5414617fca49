use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims shared between token issuance (login) and the REST auth
/// middleware. Canonical definition lives here in quill-types to eliminate
/// duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Auth --

/// OAuth2 password-flow form body: the `username` field carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// -- Posts --

/// Request body for both create and update: an update replaces
/// title/content/published wholesale.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub owner_id: i64,
    pub owner: UserOut,
}

/// A post annotated with its current upvote count. The capitalised `Post`
/// key is part of the stable wire contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostVoted {
    #[serde(rename = "Post")]
    pub post: PostResponse,
    pub votes: i64,
}

// -- Votes --

/// `dir` is an intent signal: 1 casts an upvote, 0 removes one. There is no
/// stored downvote polarity.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    pub post_id: i64,
    pub dir: u8,
}
