use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

/// All runtime configuration, constructed once in `main` and passed down.
/// Handlers never read the environment themselves.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("QUILL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("QUILL_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()?;
        let db_path = std::env::var("QUILL_DB_PATH")
            .unwrap_or_else(|_| "quill.db".into())
            .into();
        let jwt_secret =
            std::env::var("QUILL_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let jwt_algorithm = Algorithm::from_str(
            &std::env::var("QUILL_JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
        )?;
        let token_ttl_minutes: i64 = std::env::var("QUILL_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".into())
            .parse()?;

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            jwt_algorithm,
            token_ttl_minutes,
        })
    }
}
