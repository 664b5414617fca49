use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use quill_db::StoreError;
use quill_types::api::{RegisterRequest, UserOut};

use crate::error::ApiError;
use crate::{AppState, datetime_from_db, join_error};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(ApiError::Validation("password must not be empty".into()));
    }

    // Hash password with Argon2id; only the hashed form is ever stored
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(anyhow::anyhow!("password hashing failed: {e}")))?
        .to_string();

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.create_user(&req.email, &password_hash))
        .await
        .map_err(join_error)?
        .map_err(|e| match e {
            StoreError::Conflict => ApiError::Conflict("email is already registered".into()),
            e => ApiError::internal(e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UserOut {
            id: row.id,
            email: row.email,
            created_at: datetime_from_db(&row.created_at),
        }),
    ))
}

/// Just enough shape-checking to reject obviously malformed addresses with a
/// 422 instead of letting them into the unique index.
fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}
