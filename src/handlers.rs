use crate::{
    AppState,
    articles::ArticleFilter,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{
        Article, ArticleCreatedResponse, CategoryCount, Comment, Contributor, CreateArticleRequest,
        CreateCommentRequest, LikeStatus, LoginRequest, LoginResponse, MessageResponse,
        RegisterRequest, TokenRequest, TokenResponse, UpdateArticleRequest,
    },
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// ArticleListQuery
///
/// Accepted query parameters for the public article listing (GET /api/articles).
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleListQuery {
    /// Only articles in this category (case-insensitive).
    pub category: Option<String>,
    /// Only articles carrying this exact tag.
    pub tag: Option<String>,
}

/// FeaturedQuery
///
/// Query parameters for GET /api/articles/featured.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedQuery {
    /// Maximum number of articles (default 6, at most 50).
    pub limit: Option<i64>,
}

/// Parses an article id path segment; malformed ids are client errors.
fn parse_article_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidInput("Invalid article ID".to_string()))
}

// --- Accounts ---

/// register_user
///
/// [Public Route] Creates an account with a hashed password.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = MessageResponse),
        (status = 400, description = "Missing fields or user already exists", body = MessageResponse)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    state.accounts.register(request).await?;
    Ok(Json(MessageResponse::new("User registered")))
}

/// login
///
/// [Public Route] Exchanges email and password for a session token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Wrong password", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.accounts.login(request).await?))
}

/// issue_token
///
/// [Public Route] Issues a session token for a user signed in with the external
/// identity provider.
///
/// The caller is trusted: no proof of the email is checked here, and a
/// registered email yields a token for that account. Deployments must only
/// expose this route behind the identity provider's front end.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses((status = 200, description = "Token", body = TokenResponse))
)]
pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(request) = payload?;
    let token = state.accounts.exchange_token(request).await?;
    Ok(Json(TokenResponse { token }))
}

// --- Public Article Reads ---

/// get_articles
///
/// [Public Route] Lists articles, most recent first, optionally filtered by
/// category and tag.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleListQuery),
    responses((status = 200, description = "Articles", body = [Article]))
)]
pub async fn get_articles(
    State(state): State<AppState>,
    query: Result<Query<ArticleListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Article>>> {
    let Query(query) = query?;
    let filter = ArticleFilter {
        category: query.category,
        tag: query.tag,
    };
    Ok(Json(state.articles.list(filter).await?))
}

/// get_articles_by_category
///
/// [Public Route] Articles of one category, most recent first. The category is
/// matched case-insensitively; an unknown one yields an empty list.
#[utoipa::path(
    get,
    path = "/api/articles/category/{category}",
    params(("category" = String, Path, description = "Category name")),
    responses((status = 200, description = "Articles in the category", body = [Article]))
)]
pub async fn get_articles_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Article>>> {
    let filter = ArticleFilter {
        category: Some(category),
        tag: None,
    };
    Ok(Json(state.articles.list(filter).await?))
}

/// get_featured_articles
///
/// [Public Route] The most liked articles.
#[utoipa::path(
    get,
    path = "/api/articles/featured",
    params(FeaturedQuery),
    responses((status = 200, description = "Featured articles", body = [Article]))
)]
pub async fn get_featured_articles(
    State(state): State<AppState>,
    query: Result<Query<FeaturedQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Article>>> {
    let Query(query) = query?;
    Ok(Json(state.articles.featured(query.limit).await?))
}

/// get_category_summary
///
/// [Public Route] Article count per category for the home page.
#[utoipa::path(
    get,
    path = "/api/category/home",
    responses((status = 200, description = "Category counts", body = [CategoryCount]))
)]
pub async fn get_category_summary(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryCount>>> {
    Ok(Json(state.articles.category_summary().await?))
}

/// get_top_contributors
///
/// [Public Route] The ten most prolific authors.
#[utoipa::path(
    get,
    path = "/api/top-contributors",
    responses((status = 200, description = "Top contributors", body = [Contributor]))
)]
pub async fn get_top_contributors(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Contributor>>> {
    Ok(Json(state.articles.top_contributors().await?))
}

/// get_article
///
/// [Public Route] A single article by id.
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 400, description = "Invalid article ID", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    let id = parse_article_id(&id)?;
    Ok(Json(state.articles.read(id).await?))
}

/// get_comments
///
/// [Public Route] Comments on an article, newest first.
#[utoipa::path(
    get,
    path = "/api/articles/{id}/comments",
    params(("id" = String, Path, description = "Article ID")),
    responses((status = 200, description = "Comments", body = [Comment]))
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    let id = parse_article_id(&id)?;
    Ok(Json(state.interactions.list_comments(id).await?))
}

// --- Authenticated Article Actions ---

/// create_article
///
/// [Authenticated Route] Publishes a new article owned by the caller.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Created", body = ArticleCreatedResponse),
        (status = 400, description = "Missing required fields", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_article(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ArticleCreatedResponse>)> {
    let Json(request) = payload?;
    let article = state.articles.create(&identity, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ArticleCreatedResponse {
            message: "Article created".to_string(),
            article,
        }),
    ))
}

/// update_article
///
/// [Authenticated Route] Partially updates an article. Owner only.
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    params(("id" = String, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 403, description = "Not owner", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_article(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_article_id(&id)?;
    let Json(request) = payload?;
    state.articles.update(&identity, id, request).await?;
    Ok(Json(MessageResponse::new("Updated successfully")))
}

/// delete_article
///
/// [Authenticated Route] Permanently removes an article. Owner only.
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not owner", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_article(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_article_id(&id)?;
    state.articles.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("Deleted successfully")))
}

/// get_my_articles
///
/// [Authenticated Route] Articles authored by the caller.
#[utoipa::path(
    get,
    path = "/api/my-articles",
    responses((status = 200, description = "My articles", body = [Article])),
    security(("bearer" = []))
)]
pub async fn get_my_articles(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.articles.list_mine(&identity).await?))
}

// --- Interactions ---

/// toggle_like
///
/// [Authenticated Route] Likes the article, or removes the caller's like if
/// already present.
#[utoipa::path(
    post,
    path = "/api/articles/{id}/like",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "New like state", body = LikeStatus),
        (status = 404, description = "Not found", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn toggle_like(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeStatus>> {
    let id = parse_article_id(&id)?;
    Ok(Json(state.interactions.toggle_like(&identity, id).await?))
}

/// add_comment
///
/// [Authenticated Route] Appends a comment signed with the caller's identity.
#[utoipa::path(
    post,
    path = "/api/articles/{id}/comments",
    params(("id" = String, Path, description = "Article ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment added", body = Comment),
        (status = 400, description = "Empty comment", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn add_comment(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<Json<Comment>> {
    let id = parse_article_id(&id)?;
    let Json(request) = payload?;
    Ok(Json(state.interactions.add_comment(&identity, id, request).await?))
}
