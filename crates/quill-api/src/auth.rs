use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{Form, Json, extract::State, response::IntoResponse};

use quill_types::api::{LoginForm, TokenResponse};

use crate::error::ApiError;
use crate::{AppState, join_error};

/// OAuth2 password flow: the form's `username` field carries the email.
/// Unknown email and wrong password produce the same 403 so callers cannot
/// probe which addresses are registered.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let LoginForm { username, password } = form;

    let db = state.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_email(&username))
        .await
        .map_err(join_error)?
        .map_err(ApiError::internal)?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::internal(anyhow::anyhow!("corrupt stored credential: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let access_token = state.tokens.issue(user.id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}
