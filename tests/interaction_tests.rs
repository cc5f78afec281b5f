use knowledge_hub::{
    ApiError, AppConfig, AppState, Identity,
    models::{Article, CreateArticleRequest, CreateCommentRequest, LikeStatus},
};
use std::time::Duration;
use uuid::Uuid;

fn state() -> AppState {
    AppState::in_memory(AppConfig::default())
}

fn user(email: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: email.split('@').next().unwrap().to_string(),
        photo: None,
    }
}

async fn seed_article(state: &AppState) -> Article {
    let author = user("author@example.com");
    state
        .articles
        .create(
            &author,
            CreateArticleRequest {
                title: "Likeable".to_string(),
                content: "Content".to_string(),
                category: "Education".to_string(),
                ..CreateArticleRequest::default()
            },
        )
        .await
        .unwrap()
}

fn comment(text: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        comment: text.to_string(),
    }
}

// --- Likes ---

#[tokio::test]
async fn test_toggle_like_alternates() {
    let state = state();
    let article = seed_article(&state).await;
    let reader = user("reader@example.com");

    let first = state.interactions.toggle_like(&reader, article.id).await.unwrap();
    assert_eq!(first, LikeStatus { liked: true, likes: 1 });

    let second = state.interactions.toggle_like(&reader, article.id).await.unwrap();
    assert_eq!(second, LikeStatus { liked: false, likes: 0 });

    let third = state.interactions.toggle_like(&reader, article.id).await.unwrap();
    assert_eq!(third, LikeStatus { liked: true, likes: 1 });

    let stored = state.articles.read(article.id).await.unwrap();
    assert_eq!(stored.likes, vec!["reader@example.com"]);
}

#[tokio::test]
async fn test_likes_from_different_users_accumulate() {
    let state = state();
    let article = seed_article(&state).await;

    state
        .interactions
        .toggle_like(&user("a@example.com"), article.id)
        .await
        .unwrap();
    let status = state
        .interactions
        .toggle_like(&user("b@example.com"), article.id)
        .await
        .unwrap();

    assert_eq!(status, LikeStatus { liked: true, likes: 2 });
}

#[tokio::test]
async fn test_author_may_like_own_article() {
    let state = state();
    let article = seed_article(&state).await;

    let status = state
        .interactions
        .toggle_like(&user("author@example.com"), article.id)
        .await
        .unwrap();

    assert!(status.liked);
}

#[tokio::test]
async fn test_toggle_like_on_missing_article_is_not_found() {
    let state = state();

    let err = state
        .interactions
        .toggle_like(&user("reader@example.com"), Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::NotFound("Article not found".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_by_distinct_users_are_not_lost() {
    let state = state();
    let article_id = seed_article(&state).await.id;
    let readers: Vec<Identity> = (0..32)
        .map(|i| user(&format!("reader{}@example.com", i)))
        .collect();

    let like_all = |state: AppState, readers: Vec<Identity>| async move {
        let handles: Vec<_> = readers
            .into_iter()
            .map(|reader| {
                let state = state.clone();
                tokio::spawn(async move {
                    state.interactions.toggle_like(&reader, article_id).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    };

    like_all(state.clone(), readers.clone()).await;
    assert_eq!(state.articles.read(article_id).await.unwrap().likes.len(), 32);

    // Toggling again from the same users removes every like.
    like_all(state.clone(), readers).await;
    assert!(state.articles.read(article_id).await.unwrap().likes.is_empty());
}

// --- Comments ---

#[tokio::test]
async fn test_comment_is_stamped_with_caller_identity() {
    let state = state();
    let article = seed_article(&state).await;
    let reader = Identity {
        photo: Some("https://img.example.com/r.png".to_string()),
        ..user("reader@example.com")
    };

    let created = state
        .interactions
        .add_comment(&reader, article.id, comment("  Great read!  "))
        .await
        .unwrap();

    assert_eq!(created.article_id, article.id);
    assert_eq!(created.comment, "Great read!");
    assert_eq!(created.user_email, "reader@example.com");
    assert_eq!(created.user_name, "reader");
    assert_eq!(created.user_photo.as_deref(), Some("https://img.example.com/r.png"));
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let state = state();
    let article = seed_article(&state).await;

    let err = state
        .interactions
        .add_comment(&user("reader@example.com"), article.id, comment("   "))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::InvalidInput("Comment cannot be empty".to_string()));
    assert!(state.interactions.list_comments(article.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comments_are_listed_newest_first_per_article() {
    let state = state();
    let article = seed_article(&state).await;
    let other = seed_article(&state).await;
    let reader = user("reader@example.com");

    for text in ["first", "second", "third"] {
        state
            .interactions
            .add_comment(&reader, article.id, comment(text))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    state
        .interactions
        .add_comment(&reader, other.id, comment("elsewhere"))
        .await
        .unwrap();

    let listed: Vec<String> = state
        .interactions
        .list_comments(article.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment)
        .collect();

    assert_eq!(listed, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_comment_on_unknown_article_is_accepted() {
    let state = state();
    let orphan_id = Uuid::new_v4();

    state
        .interactions
        .add_comment(&user("reader@example.com"), orphan_id, comment("hello?"))
        .await
        .unwrap();

    assert_eq!(state.interactions.list_comments(orphan_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_comments_survive_article_deletion() {
    let state = state();
    let article = seed_article(&state).await;
    state
        .interactions
        .add_comment(&user("reader@example.com"), article.id, comment("kept"))
        .await
        .unwrap();

    state
        .articles
        .delete(&user("author@example.com"), article.id)
        .await
        .unwrap();

    assert_eq!(state.interactions.list_comments(article.id).await.unwrap().len(), 1);
}
