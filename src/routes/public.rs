use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and accessible to any client. Reads of
/// articles and comments are public; every write lives in the authenticated router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and container orchestration.
        .route("/health", get(|| async { "ok" }))
        // --- Accounts ---
        // POST /api/register
        // Creates an account; the password is stored only as a bcrypt digest.
        .route("/api/register", post(handlers::register_user))
        // POST /api/login
        // Verifies the password and returns a 7-day session token plus the user.
        .route("/api/login", post(handlers::login))
        // POST /jwt
        // Token exchange for users signed in through the external identity provider.
        .route("/jwt", post(handlers::issue_token))
        // --- Browsing ---
        // GET /api/articles?category=...&tag=...
        // Public list, most recent first. The owner-scoped list is /api/my-articles.
        .route("/api/articles", get(handlers::get_articles))
        // GET /api/articles/featured?limit=...
        // Most liked articles for the home page.
        .route("/api/articles/featured", get(handlers::get_featured_articles))
        // GET /api/articles/category/{category}
        // One category's articles, most recent first.
        .route(
            "/api/articles/category/{category}",
            get(handlers::get_articles_by_category),
        )
        // GET /api/category/home
        // Article count for every category.
        .route("/api/category/home", get(handlers::get_category_summary))
        // GET /api/top-contributors
        // Ten most prolific authors.
        .route("/api/top-contributors", get(handlers::get_top_contributors))
        // GET /api/articles/{id}
        .route("/api/articles/{id}", get(handlers::get_article))
        // GET /api/articles/{id}/comments
        // Comments newest first. The article itself is not required to exist.
        .route("/api/articles/{id}/comments", get(handlers::get_comments))
}
