use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

// --- Core Records (Mapped to Database) ---

/// User
///
/// Credential record from the `users` table. Never serialized as-is: the password
/// digest stays server-side, clients receive a [`PublicUser`].
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Login key, unique across the table.
    pub email: String,
    // bcrypt digest of the password.
    pub password_hash: String,
}

/// PublicUser
///
/// The subset of a user returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Category
///
/// The fixed set of article categories. Input is matched case-insensitively,
/// output always uses the canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum Category {
    Technology,
    Health,
    Education,
    Lifestyle,
    Science,
    Business,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Health,
        Category::Education,
        Category::Lifestyle,
        Category::Science,
        Category::Business,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Lifestyle => "Lifestyle",
            Category::Science => "Science",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseCategoryError(wanted.to_string()))
    }
}

// Used by sqlx to decode the TEXT column.
impl TryFrom<String> for Category {
    type Error = ParseCategoryError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Article
///
/// A published article from the `articles` table. `author_email` is the ownership
/// key; `likes` holds each liking user's email at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,

    // Publication date chosen by the author, distinct from `created_at`.
    #[ts(type = "string")]
    pub date: DateTime<Utc>,

    pub author_email: String,
    pub author_name: String,
    pub likes: Vec<String>,

    // Server-assigned, never changed after insertion.
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.author_email == email
    }
}

/// Comment
///
/// Append-only comment from the `comments` table. `article_id` is not checked
/// against `articles`: comments may be attached to any well-formed id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_photo: Option<String>,
    // The comment body; never empty.
    pub comment: String,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for `POST /api/register`. Absent fields deserialize as empty
/// strings so that every omission is reported by [`RegisterRequest::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> ApiResult<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(ApiError::InvalidInput(
                "Name, email, and password are required".to_string(),
            ));
        }
        Ok(Self {
            name,
            email,
            password: self.password,
        })
    }
}

/// LoginRequest
///
/// Input payload for `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> ApiResult<Self> {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            return Err(ApiError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// TokenRequest
///
/// Input payload for `POST /jwt`, sent by the client after the external identity
/// provider signed the user in.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// TagsInput
///
/// Tags arrive either as one comma-separated string or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum TagsInput {
    Text(String),
    List(Vec<String>),
}

impl TagsInput {
    /// Splits, trims, drops empties and removes duplicates, keeping first occurrence order.
    pub fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagsInput::Text(text) => text.split(',').map(str::to_string).collect(),
            TagsInput::List(list) => list,
        };

        let mut tags: Vec<String> = Vec::with_capacity(raw.len());
        for tag in raw {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|seen| seen == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// Parses a publication date given as RFC 3339, a naive ISO datetime, or `YYYY-MM-DD`.
pub fn parse_publication_date(raw: &str) -> ApiResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::InvalidInput(format!("Invalid date '{}'", raw)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// CreateArticleRequest
///
/// Input payload for `POST /api/articles`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    // RFC 3339 or YYYY-MM-DD; defaults to the submission time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// The validated, normalized fields of a new article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub date: DateTime<Utc>,
}

impl CreateArticleRequest {
    pub fn validate(self, now: DateTime<Utc>) -> ApiResult<ArticleDraft> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();
        let category = self.category.trim();
        if title.is_empty() || content.is_empty() || category.is_empty() {
            return Err(ApiError::InvalidInput(
                "Title, content, and category are required".to_string(),
            ));
        }
        let category = category
            .parse::<Category>()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let date = match non_empty(self.date) {
            Some(raw) => parse_publication_date(&raw)?,
            None => now,
        };

        Ok(ArticleDraft {
            title,
            content,
            category,
            tags: self.tags.map(TagsInput::normalize).unwrap_or_default(),
            thumbnail_url: non_empty(self.thumbnail_url),
            date,
        })
    }
}

/// UpdateArticleRequest
///
/// Partial update payload for `PUT /api/articles/{id}`. Only supplied keys are
/// applied; ownership and server-assigned fields cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateArticleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsInput>,
    // An empty string clears the thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl UpdateArticleRequest {
    /// Merges the supplied fields into `article`, rejecting a result with an empty
    /// title or content.
    pub fn apply_to(self, mut article: Article) -> ApiResult<Article> {
        if let Some(title) = self.title {
            article.title = title.trim().to_string();
        }
        if let Some(content) = self.content {
            article.content = content.trim().to_string();
        }
        if let Some(category) = self.category {
            article.category = category
                .parse()
                .map_err(|e: ParseCategoryError| ApiError::InvalidInput(e.to_string()))?;
        }
        if let Some(tags) = self.tags {
            article.tags = tags.normalize();
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            article.thumbnail_url = non_empty(Some(thumbnail_url));
        }
        if let Some(date) = self.date {
            article.date = parse_publication_date(&date)?;
        }

        if article.title.is_empty() || article.content.is_empty() {
            return Err(ApiError::InvalidInput(
                "Title and content cannot be empty".to_string(),
            ));
        }
        Ok(article)
    }
}

/// CreateCommentRequest
///
/// Input payload for `POST /api/articles/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub comment: String,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returned by `POST /api/articles` together with a 201 status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleCreatedResponse {
    pub message: String,
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// LikeStatus
///
/// Outcome of a like toggle: the caller's new membership and the resulting count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes: i64,
}

/// Number of articles in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}

/// Contributor
///
/// One row of the top-contributors ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contributor {
    pub email: String,
    pub name: String,
    pub total_articles: i64,
    #[ts(type = "string")]
    pub last_article_date: DateTime<Utc>,
}
