use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every route here is wrapped in the `require_auth` route layer by
/// `create_router`, so handlers always receive a verified `AuthUser`. Ownership
/// of individual articles is then checked by the article lifecycle service.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /api/articles
        // Publishes an article authored by the caller.
        .route("/api/articles", post(handlers::create_article))
        // PUT/DELETE /api/articles/{id}
        // Owner-only partial update and deletion.
        .route(
            "/api/articles/{id}",
            put(handlers::update_article).delete(handlers::delete_article),
        )
        // POST /api/articles/{id}/like
        // Toggles the caller's like. Any authenticated user may like any article.
        .route("/api/articles/{id}/like", post(handlers::toggle_like))
        // POST /api/articles/{id}/comments
        // Appends a comment stamped with the caller's name, email and photo.
        .route("/api/articles/{id}/comments", post(handlers::add_comment))
        // GET /api/my-articles
        // The caller's own articles.
        .route("/api/my-articles", get(handlers::get_my_articles))
}
