pub mod config;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quill_api::middleware::require_auth;
use quill_api::{AppState, auth, posts, users, votes};

/// Assemble the full HTTP surface. Register and login are public; every
/// post/vote route sits behind the auth middleware, so a missing or invalid
/// token fails 401 before any existence or ownership check runs.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users/", post(users::create_user))
        .route("/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/posts/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/vote/", post(votes::cast_vote))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .route("/", get(root))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Welcome to the quill API" }))
}
