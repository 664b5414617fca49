use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use quill_db::StoreError;
use quill_db::models::{PostRow, PostWithVotes, UserRow};
use quill_types::api::{Claims, PostCreate, PostResponse, PostVoted, UserOut};

use crate::error::ApiError;
use crate::{AppState, datetime_from_db, join_error};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub search: String,
}

fn default_limit() -> i64 {
    10
}

fn post_response(post: PostRow, owner: UserRow) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        published: post.published,
        created_at: datetime_from_db(&post.created_at),
        owner_id: post.owner_id,
        owner: UserOut {
            id: owner.id,
            email: owner.email,
            created_at: datetime_from_db(&owner.created_at),
        },
    }
}

fn voted_response(row: PostWithVotes) -> PostVoted {
    let owner = UserOut {
        id: row.post.owner_id,
        email: row.owner_email,
        created_at: datetime_from_db(&row.owner_created_at),
    };
    PostVoted {
        post: PostResponse {
            id: row.post.id,
            title: row.post.title,
            content: row.post.content,
            published: row.post.published,
            created_at: datetime_from_db(&row.post.created_at),
            owner_id: row.post.owner_id,
            owner,
        },
        votes: row.votes,
    }
}

/// Any authenticated caller may list any post; the middleware has already
/// resolved the identity, so no ownership filter applies here.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || {
        db.db.list_posts(&query.search, query.limit, query.skip)
    })
    .await
    .map_err(join_error)?
    .map_err(ApiError::internal)?;

    let posts: Vec<PostVoted> = rows.into_iter().map(voted_response).collect();
    Ok(Json(posts))
}

/// The owner is always the caller; a client cannot create a post on behalf
/// of someone else.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.user_id;

    let (post, owner) = tokio::task::spawn_blocking(move || {
        // A valid token for a since-deleted user is stale, not internal
        let owner = db
            .db
            .get_user_by_id(user_id)
            .map_err(ApiError::internal)?
            .ok_or(ApiError::Auth)?;
        let post = db
            .db
            .create_post(user_id, &req.title, &req.content, req.published)
            .map_err(ApiError::internal)?;
        Ok::<_, ApiError>((post, owner))
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(post_response(post, owner))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_post_with_votes(id))
        .await
        .map_err(join_error)?
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound(format!("post with id: {id} was not found")))?;

    Ok(Json(voted_response(row)))
}

/// Existence is checked before ownership: updating someone else's
/// nonexistent post yields 404, not 403.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.user_id;

    let (post, owner) = tokio::task::spawn_blocking(move || {
        let existing = db
            .db
            .get_post(id)
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::NotFound(format!("post with id: {id} does not exist")))?;
        if existing.owner_id != user_id {
            return Err(ApiError::Forbidden);
        }

        let post = db
            .db
            .update_post(id, &req.title, &req.content, req.published)
            .map_err(|e| match e {
                StoreError::NotFound => {
                    ApiError::NotFound(format!("post with id: {id} does not exist"))
                }
                e => ApiError::internal(e),
            })?;
        let owner = db
            .db
            .get_user_by_id(user_id)
            .map_err(ApiError::internal)?
            .ok_or(ApiError::Auth)?;
        Ok::<_, ApiError>((post, owner))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(post_response(post, owner)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.user_id;

    tokio::task::spawn_blocking(move || {
        let existing = db
            .db
            .get_post(id)
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::NotFound(format!("post with id: {id} does not exist")))?;
        if existing.owner_id != user_id {
            return Err(ApiError::Forbidden);
        }

        // Dependent vote rows cascade with the post
        db.db.delete_post(id).map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound(format!("post with id: {id} does not exist")),
            e => ApiError::internal(e),
        })
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
