pub mod auth;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod token;
pub mod users;
pub mod votes;

use std::sync::Arc;

use tracing::warn;

use quill_db::Database;

use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> crate::error::ApiError {
    tracing::error!("spawn_blocking join error: {}", e);
    crate::error::ApiError::internal(e)
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert; fall back to RFC 3339 for completeness.
pub(crate) fn datetime_from_db(raw: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .or_else(|_| raw.parse::<chrono::DateTime<chrono::Utc>>())
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", raw, e);
            chrono::DateTime::default()
        })
}
