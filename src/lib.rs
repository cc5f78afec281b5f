use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain services.
pub mod accounts;
pub mod articles;
pub mod interactions;

// Infrastructure and HTTP plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod token;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use accounts::Accounts;
pub use articles::ArticleLifecycle;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use interactions::Interactions;
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};
pub use token::{Identity, TokenService};

/// ApiDoc
///
/// Generated OpenAPI document, served at `/api-docs/openapi.json` and browsable
/// through the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login, handlers::issue_token,
        handlers::get_articles, handlers::get_articles_by_category, handlers::get_featured_articles,
        handlers::get_category_summary, handlers::get_top_contributors, handlers::get_article,
        handlers::get_comments,
        handlers::create_article, handlers::update_article, handlers::delete_article,
        handlers::get_my_articles, handlers::toggle_like, handlers::add_comment
    ),
    components(
        schemas(
            models::Article, models::Category, models::Comment, models::PublicUser,
            models::RegisterRequest, models::LoginRequest, models::LoginResponse,
            models::TokenRequest, models::TokenResponse, models::CreateArticleRequest,
            models::UpdateArticleRequest, models::TagsInput, models::CreateCommentRequest,
            models::MessageResponse, models::ArticleCreatedResponse, models::LikeStatus,
            models::CategoryCount, models::Contributor,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "knowledge-hub", description = "Knowledge Hub article API")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the authenticated paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single, immutable container shared by every request. Services hold their
/// own handle on the repository, so handlers never touch storage directly.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (Postgres in production, in-memory under test).
    pub repo: RepositoryState,
    /// Session token signer/verifier, used by the `AuthUser` extractor.
    pub tokens: TokenService,
    pub config: AppConfig,
    pub accounts: Accounts,
    pub articles: ArticleLifecycle,
    pub interactions: Interactions,
}

impl AppState {
    /// Wires the services on top of `repo` using the secrets and tuning in `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        Self {
            accounts: Accounts::new(repo.clone(), tokens.clone(), config.bcrypt_cost),
            articles: ArticleLifecycle::new(repo.clone()),
            interactions: Interactions::new(repo.clone()),
            repo,
            tokens,
            config,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(Arc::new(InMemoryRepository::new()), config)
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, applies the authentication route layer to the
/// authenticated router and wraps everything in the observability stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Rejects requests without a valid token before any handler runs.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_auth,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: every log line emitted while serving a request
/// carries its method, URI and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
