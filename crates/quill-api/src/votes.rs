use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use quill_db::StoreError;
use quill_types::api::{Claims, VoteRequest};

use crate::error::ApiError;
use crate::{AppState, join_error};

/// The vote toggle: `dir=1` casts an upvote, `dir=0` removes one. Strict
/// two-state machine per (user, post) pair — a duplicate upvote is a 409 and
/// removing an absent vote is a 404, with no mutation in either case.
/// Self-voting is allowed on purpose.
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.dir > 1 {
        return Err(ApiError::Validation("dir must be 0 or 1".into()));
    }

    let db = state.clone();
    let user_id = claims.user_id;
    let VoteRequest { post_id, dir } = req;

    let message = tokio::task::spawn_blocking(move || {
        // Post existence comes first, before the ledger is touched
        if db
            .db
            .get_post(post_id)
            .map_err(ApiError::internal)?
            .is_none()
        {
            return Err(ApiError::NotFound(format!(
                "post with id: {post_id} does not exist"
            )));
        }

        if dir == 1 {
            // The composite primary key also catches the concurrent
            // double-upvote race: the losing insert surfaces as Conflict
            db.db.insert_vote(user_id, post_id).map_err(|e| match e {
                StoreError::Conflict => ApiError::Conflict(format!(
                    "user {user_id} has already voted on post {post_id}"
                )),
                e => ApiError::internal(e),
            })?;
            Ok("successfully added vote")
        } else {
            db.db.delete_vote(user_id, post_id).map_err(|e| match e {
                StoreError::NotFound => {
                    ApiError::NotFound("vote does not exist".into())
                }
                e => ApiError::internal(e),
            })?;
            Ok("successfully deleted vote")
        }
    })
    .await
    .map_err(join_error)??;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": message })),
    ))
}
