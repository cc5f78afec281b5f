use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions, query_builder::QueryBuilder};
use uuid::Uuid;

use super::{ArticleQuery, RepoResult, Repository};
use crate::{
    config::AppConfig,
    models::{Article, CategoryCount, Comment, Contributor, LikeStatus, User},
};

const ARTICLE_COLUMNS: &str = "id, title, content, category, tags, thumbnail_url, date, \
                               author_email, author_name, likes, created_at";

const COMMENT_COLUMNS: &str = "id, article_id, user_name, user_email, user_photo, comment, date";

/// PostgresRepository
///
/// The production implementation of [`Repository`], backed by a Postgres pool.
/// Every mutating method is a single statement, so each write is atomic per row.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Wraps an already initialized pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// connect
    ///
    /// Opens the connection pool and applies the embedded migrations. This is the
    /// storage layer's init step; [`Repository::close`] is its teardown.
    pub async fn connect(config: &AppConfig) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.db_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Relies on the unique index on `email`: a conflicting insert returns no row,
    /// so two concurrent registrations of one email cannot both succeed.
    async fn create_user(&self, user: User) -> RepoResult<Option<User>> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn insert_article(&self, article: Article) -> RepoResult<Article> {
        let sql = format!(
            "INSERT INTO articles ({ARTICLE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Article>(&sql)
            .bind(article.id)
            .bind(article.title)
            .bind(article.content)
            .bind(article.category.as_str())
            .bind(article.tags)
            .bind(article.thumbnail_url)
            .bind(article.date)
            .bind(article.author_email)
            .bind(article.author_name)
            .bind(article.likes)
            .bind(article.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    /// list_articles
    ///
    /// Builds the filter with `QueryBuilder` so every user-supplied value is bound,
    /// never interpolated.
    async fn list_articles(&self, query: ArticleQuery) -> RepoResult<Vec<Article>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE TRUE"));

        if let Some(category) = query.category {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }
        if let Some(tag) = query.tag {
            builder.push(" AND ");
            builder.push_bind(tag);
            builder.push(" = ANY(tags)");
        }
        if let Some(email) = query.author_email {
            builder.push(" AND author_email = ");
            builder.push_bind(email);
        }

        builder.push(" ORDER BY created_at DESC, id ASC");

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn top_liked_articles(&self, limit: i64) -> RepoResult<Vec<Article>> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             ORDER BY cardinality(likes) DESC, created_at DESC, id ASC \
             LIMIT $1"
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn category_counts(&self) -> RepoResult<Vec<CategoryCount>> {
        let counts = sqlx::query_as::<_, CategoryCount>(
            "SELECT category AS name, COUNT(*) AS count FROM articles GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// top_contributors
    ///
    /// The display name is taken from the author's most recent article.
    async fn top_contributors(&self, limit: i64) -> RepoResult<Vec<Contributor>> {
        let contributors = sqlx::query_as::<_, Contributor>(
            r#"
            SELECT
                author_email AS email,
                (ARRAY_AGG(author_name ORDER BY created_at DESC, id ASC))[1] AS name,
                COUNT(*) AS total_articles,
                MAX(created_at) AS last_article_date
            FROM articles
            GROUP BY author_email
            ORDER BY total_articles DESC, last_article_date DESC, email ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(contributors)
    }

    /// update_article
    ///
    /// The `author_email` predicate makes the ownership check part of the write
    /// itself. `author_*`, `likes` and `created_at` are never touched.
    async fn update_article(
        &self,
        article: Article,
        owner_email: &str,
    ) -> RepoResult<Option<Article>> {
        let sql = format!(
            "UPDATE articles \
             SET title = $3, content = $4, category = $5, tags = $6, thumbnail_url = $7, date = $8 \
             WHERE id = $1 AND author_email = $2 \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Article>(&sql)
            .bind(article.id)
            .bind(owner_email)
            .bind(article.title)
            .bind(article.content)
            .bind(article.category.as_str())
            .bind(article.tags)
            .bind(article.thumbnail_url)
            .bind(article.date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_article(&self, id: Uuid, owner_email: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1 AND author_email = $2")
            .bind(id)
            .bind(owner_email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// toggle_like
    ///
    /// One `UPDATE` decides membership and rewrites the array under the row lock,
    /// so two concurrent toggles can never both observe the same prior state.
    async fn toggle_like(&self, id: Uuid, email: &str) -> RepoResult<Option<LikeStatus>> {
        let status = sqlx::query_as::<_, LikeStatus>(
            r#"
            UPDATE articles
            SET likes = CASE
                WHEN $2::TEXT = ANY(likes) THEN array_remove(likes, $2::TEXT)
                ELSE array_append(likes, $2::TEXT)
            END
            WHERE id = $1
            RETURNING ($2::TEXT = ANY(likes)) AS liked, cardinality(likes)::BIGINT AS likes
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status)
    }

    async fn insert_comment(&self, comment: Comment) -> RepoResult<Comment> {
        let sql = format!(
            "INSERT INTO comments ({COMMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COMMENT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.id)
            .bind(comment.article_id)
            .bind(comment.user_name)
            .bind(comment.user_email)
            .bind(comment.user_photo)
            .bind(comment.comment)
            .bind(comment.date)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_comments(&self, article_id: Uuid) -> RepoResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = $1 \
             ORDER BY date DESC, id ASC"
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
