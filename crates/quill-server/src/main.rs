use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use quill_api::token::TokenService;
use quill_api::{AppState, AppStateInner};
use quill_server::config::Config;
use quill_server::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = quill_db::Database::open(&config.db_path)?;
    let tokens = TokenService::new(
        &config.jwt_secret,
        config.jwt_algorithm,
        config.token_ttl_minutes,
    );

    let state: AppState = Arc::new(AppStateInner { db, tokens });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Quill server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
