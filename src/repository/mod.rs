use crate::models::{Article, CategoryCount, Comment, Contributor, LikeStatus, Category, User};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Failure of the storage layer itself. Business outcomes such as "not found" or
/// "email already taken" are expressed through `Option`/`bool` return values.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// ArticleQuery
///
/// Conjunctive filter for article listings. `None` fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub author_email: Option<String>,
}

impl ArticleQuery {
    pub fn matches(&self, article: &Article) -> bool {
        self.category.is_none_or(|c| article.category == c)
            && self
                .tag
                .as_ref()
                .is_none_or(|tag| article.tags.iter().any(|t| t == tag))
            && self
                .author_email
                .as_ref()
                .is_none_or(|email| &article.author_email == email)
    }
}

/// Repository Trait
///
/// The persistence contract shared by the Postgres store and the in-memory store
/// used in tests. Handlers and services only ever see `Arc<dyn Repository>`.
///
/// Listing methods return articles ordered by `created_at` descending with ties
/// broken by `id` ascending, and comments by `date` descending (ties by `id`).
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Inserts `user` unless the email is taken, in which case `None` is returned.
    async fn create_user(&self, user: User) -> RepoResult<Option<User>>;

    // --- Article Store ---
    async fn insert_article(&self, article: Article) -> RepoResult<Article>;
    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>>;
    async fn list_articles(&self, query: ArticleQuery) -> RepoResult<Vec<Article>>;
    /// Articles ranked by like count, most liked first.
    async fn top_liked_articles(&self, limit: i64) -> RepoResult<Vec<Article>>;
    /// Per-category counts; categories without articles are omitted.
    async fn category_counts(&self) -> RepoResult<Vec<CategoryCount>>;
    async fn top_contributors(&self, limit: i64) -> RepoResult<Vec<Contributor>>;

    /// Overwrites the editable fields of `article`, only if it is still owned by
    /// `owner_email`. Returns `None` when no such row exists.
    async fn update_article(&self, article: Article, owner_email: &str)
    -> RepoResult<Option<Article>>;
    /// Deletes the article only if owned by `owner_email`. Returns true if a row was removed.
    async fn delete_article(&self, id: Uuid, owner_email: &str) -> RepoResult<bool>;

    /// Flips `email`'s membership in the article's like set as one atomic
    /// conditional write. Returns `None` if the article does not exist.
    async fn toggle_like(&self, id: Uuid, email: &str) -> RepoResult<Option<LikeStatus>>;

    // --- Comment Store (append-only) ---
    async fn insert_comment(&self, comment: Comment) -> RepoResult<Comment>;
    async fn list_comments(&self, article_id: Uuid) -> RepoResult<Vec<Comment>>;

    /// Releases the underlying storage resources. Called once on shutdown.
    async fn close(&self) {}
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application.
pub type RepositoryState = Arc<dyn Repository>;
