//! Likes and comments.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Comment, CreateCommentRequest, LikeStatus},
    repository::RepositoryState,
    token::Identity,
};

/// Interactions
///
/// Like toggling is open to every authenticated user (not only the owner) and is
/// delegated to the store as one conditional write. Comments are append-only.
#[derive(Clone)]
pub struct Interactions {
    repo: RepositoryState,
}

impl Interactions {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// toggle_like
    ///
    /// Adds the caller to the like set if absent, removes them if present.
    pub async fn toggle_like(&self, identity: &Identity, article_id: Uuid) -> ApiResult<LikeStatus> {
        let status = self
            .repo
            .toggle_like(article_id, &identity.email)
            .await?
            .ok_or_else(ApiError::article_not_found)?;

        tracing::debug!(
            article_id = %article_id,
            liked = status.liked,
            likes = status.likes,
            "like toggled"
        );
        Ok(status)
    }

    /// add_comment
    ///
    /// The parent article is deliberately not looked up: comments may reference
    /// any well-formed article id.
    pub async fn add_comment(
        &self,
        identity: &Identity,
        article_id: Uuid,
        request: CreateCommentRequest,
    ) -> ApiResult<Comment> {
        let body = request.comment.trim();
        if body.is_empty() {
            return Err(ApiError::InvalidInput("Comment cannot be empty".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            article_id,
            user_name: identity.name.clone(),
            user_email: identity.email.clone(),
            user_photo: identity.photo.clone(),
            comment: body.to_string(),
            date: Utc::now(),
        };

        let created = self.repo.insert_comment(comment).await?;
        tracing::info!(article_id = %article_id, comment_id = %created.id, "comment added");
        Ok(created)
    }

    /// Newest first.
    pub async fn list_comments(&self, article_id: Uuid) -> ApiResult<Vec<Comment>> {
        Ok(self.repo.list_comments(article_id).await?)
    }
}
