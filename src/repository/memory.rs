use std::{cmp::Reverse, collections::HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleQuery, RepoError, RepoResult, Repository};
use crate::models::{Article, CategoryCount, Comment, Contributor, LikeStatus, User};

/// InMemoryRepository
///
/// A process-local implementation of [`Repository`] for tests and demos. Each
/// collection sits behind its own lock; every mutation happens inside a single
/// write-lock critical section, which gives the same per-record atomicity as the
/// single-statement Postgres writes.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<String, User>>,
    articles: RwLock<HashMap<Uuid, Article>>,
    comments: RwLock<Vec<Comment>>,
    /// When true, all operations return a simulated storage failure.
    pub should_fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> RepoResult<()> {
        if self.should_fail {
            return Err(RepoError::Unavailable(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.check()?;
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(&self, user: User) -> RepoResult<Option<User>> {
        self.check()?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Ok(None);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(Some(user))
    }

    async fn insert_article(&self, article: Article) -> RepoResult<Article> {
        self.check()?;
        self.articles
            .write()
            .await
            .insert(article.id, article.clone());
        Ok(article)
    }

    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        self.check()?;
        Ok(self.articles.read().await.get(&id).cloned())
    }

    async fn list_articles(&self, query: ArticleQuery) -> RepoResult<Vec<Article>> {
        self.check()?;
        let mut articles: Vec<Article> = self
            .articles
            .read()
            .await
            .values()
            .filter(|article| query.matches(article))
            .cloned()
            .collect();
        sort_articles(&mut articles);
        Ok(articles)
    }

    async fn top_liked_articles(&self, limit: i64) -> RepoResult<Vec<Article>> {
        self.check()?;
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        sort_articles(&mut articles);
        // Stable sort keeps the recency order among equally liked articles.
        articles.sort_by_key(|article| Reverse(article.likes.len()));
        articles.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(articles)
    }

    async fn category_counts(&self) -> RepoResult<Vec<CategoryCount>> {
        self.check()?;
        let mut counts: HashMap<&'static str, i64> = HashMap::new();
        for article in self.articles.read().await.values() {
            *counts.entry(article.category.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect())
    }

    async fn top_contributors(&self, limit: i64) -> RepoResult<Vec<Contributor>> {
        self.check()?;
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        // Newest first, ties by id: the first article seen per author names them.
        sort_articles(&mut articles);

        let mut by_author: HashMap<String, Contributor> = HashMap::new();
        for article in &articles {
            by_author
                .entry(article.author_email.clone())
                .or_insert_with(|| Contributor {
                    email: article.author_email.clone(),
                    name: article.author_name.clone(),
                    total_articles: 0,
                    last_article_date: article.created_at,
                })
                .total_articles += 1;
        }

        let mut contributors: Vec<Contributor> = by_author.into_values().collect();
        contributors.sort_by(|a, b| {
            b.total_articles
                .cmp(&a.total_articles)
                .then_with(|| b.last_article_date.cmp(&a.last_article_date))
                .then_with(|| a.email.cmp(&b.email))
        });
        contributors.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(contributors)
    }

    async fn update_article(
        &self,
        article: Article,
        owner_email: &str,
    ) -> RepoResult<Option<Article>> {
        self.check()?;
        let mut articles = self.articles.write().await;
        let Some(stored) = articles
            .get_mut(&article.id)
            .filter(|stored| stored.is_owned_by(owner_email))
        else {
            return Ok(None);
        };

        stored.title = article.title;
        stored.content = article.content;
        stored.category = article.category;
        stored.tags = article.tags;
        stored.thumbnail_url = article.thumbnail_url;
        stored.date = article.date;
        Ok(Some(stored.clone()))
    }

    async fn delete_article(&self, id: Uuid, owner_email: &str) -> RepoResult<bool> {
        self.check()?;
        let mut articles = self.articles.write().await;
        match articles.get(&id) {
            Some(article) if article.is_owned_by(owner_email) => {
                articles.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn toggle_like(&self, id: Uuid, email: &str) -> RepoResult<Option<LikeStatus>> {
        self.check()?;
        let mut articles = self.articles.write().await;
        let Some(article) = articles.get_mut(&id) else {
            return Ok(None);
        };

        let liked = match article.likes.iter().position(|liker| liker == email) {
            Some(index) => {
                article.likes.remove(index);
                false
            }
            None => {
                article.likes.push(email.to_string());
                true
            }
        };

        Ok(Some(LikeStatus {
            liked,
            likes: article.likes.len() as i64,
        }))
    }

    async fn insert_comment(&self, comment: Comment) -> RepoResult<Comment> {
        self.check()?;
        self.comments.write().await.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, article_id: Uuid) -> RepoResult<Vec<Comment>> {
        self.check()?;
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|comment| comment.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }
}
