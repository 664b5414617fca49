use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::ApiError;

/// Extract and validate the JWT from the Authorization header, then attach
/// the claims as a request extension so handlers receive the caller identity
/// explicitly. Runs before any existence or ownership check.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Auth)?;

    let token = auth_header.strip_prefix("Bearer ").ok_or(ApiError::Auth)?;

    let claims = state.tokens.verify(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
