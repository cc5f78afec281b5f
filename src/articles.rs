//! Article lifecycle: ownership-scoped create/update/delete, public reads and the
//! browse aggregates shown on the home page.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Article, Category, CategoryCount, Contributor, CreateArticleRequest, UpdateArticleRequest},
    repository::{ArticleQuery, RepositoryState},
    token::Identity,
};

pub const DEFAULT_FEATURED_LIMIT: i64 = 6;
pub const MAX_FEATURED_LIMIT: i64 = 50;
pub const TOP_CONTRIBUTORS_LIMIT: i64 = 10;

/// ArticleFilter
///
/// Public listing filter as received from the query string. Blank values are
/// treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// ArticleLifecycle
///
/// Enforces the ownership rules over the article store. Every article enters
/// storage through [`ArticleLifecycle::create`], which stamps the verified
/// caller as its author.
#[derive(Clone)]
pub struct ArticleLifecycle {
    repo: RepositoryState,
}

impl ArticleLifecycle {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn create(&self, identity: &Identity, request: CreateArticleRequest) -> ApiResult<Article> {
        let now = Utc::now();
        let draft = request.validate(now)?;

        let article = Article {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            thumbnail_url: draft.thumbnail_url,
            date: draft.date,
            author_email: identity.email.clone(),
            author_name: identity.name.clone(),
            likes: Vec::new(),
            created_at: now,
        };

        let created = self.repo.insert_article(article).await?;
        tracing::info!(article_id = %created.id, author = %created.author_email, "article created");
        Ok(created)
    }

    pub async fn read(&self, id: Uuid) -> ApiResult<Article> {
        self.repo
            .get_article(id)
            .await?
            .ok_or_else(ApiError::article_not_found)
    }

    /// list
    ///
    /// Most recent first. A category outside the known set matches nothing.
    pub async fn list(&self, filter: ArticleFilter) -> ApiResult<Vec<Article>> {
        let category = match blank_to_none(filter.category) {
            Some(raw) => match raw.parse::<Category>() {
                Ok(category) => Some(category),
                Err(_) => return Ok(Vec::new()),
            },
            None => None,
        };

        let query = ArticleQuery {
            category,
            tag: blank_to_none(filter.tag),
            author_email: None,
        };
        Ok(self.repo.list_articles(query).await?)
    }

    /// Articles authored by the caller, most recent first.
    pub async fn list_mine(&self, identity: &Identity) -> ApiResult<Vec<Article>> {
        let query = ArticleQuery {
            author_email: Some(identity.email.clone()),
            ..ArticleQuery::default()
        };
        Ok(self.repo.list_articles(query).await?)
    }

    /// update
    ///
    /// Partial update by the owner. The final write is still conditioned on the
    /// owner's email, so an article deleted in between reports `NotFound`.
    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        request: UpdateArticleRequest,
    ) -> ApiResult<Article> {
        let current = self.owned_article(identity, id).await?;
        let merged = request.apply_to(current)?;

        let updated = self
            .repo
            .update_article(merged, &identity.email)
            .await?
            .ok_or_else(ApiError::article_not_found)?;
        tracing::info!(article_id = %id, "article updated");
        Ok(updated)
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> ApiResult<()> {
        self.owned_article(identity, id).await?;

        if !self.repo.delete_article(id, &identity.email).await? {
            return Err(ApiError::article_not_found());
        }
        tracing::info!(article_id = %id, "article deleted");
        Ok(())
    }

    /// Most liked articles; `limit` defaults to 6 and is clamped to `1..=50`.
    pub async fn featured(&self, limit: Option<i64>) -> ApiResult<Vec<Article>> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_FEATURED_LIMIT);
        Ok(self.repo.top_liked_articles(limit).await?)
    }

    /// Every category with its article count, in declaration order.
    pub async fn category_summary(&self) -> ApiResult<Vec<CategoryCount>> {
        let counts = self.repo.category_counts().await?;
        Ok(Category::ALL
            .iter()
            .map(|category| CategoryCount {
                name: category.as_str().to_string(),
                count: counts
                    .iter()
                    .find(|c| c.name == category.as_str())
                    .map_or(0, |c| c.count),
            })
            .collect())
    }

    pub async fn top_contributors(&self) -> ApiResult<Vec<Contributor>> {
        Ok(self.repo.top_contributors(TOP_CONTRIBUTORS_LIMIT).await?)
    }

    async fn owned_article(&self, identity: &Identity, id: Uuid) -> ApiResult<Article> {
        let article = self.read(id).await?;
        if !article.is_owned_by(&identity.email) {
            tracing::warn!(article_id = %id, caller = %identity.email, "ownership check failed");
            return Err(ApiError::not_owner());
        }
        Ok(article)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
