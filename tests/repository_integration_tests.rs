//! Postgres-backed repository tests. They need a reachable database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::Utc;
use knowledge_hub::{
    AppConfig,
    models::{Article, Category, Comment, User},
    repository::{ArticleQuery, PostgresRepository, Repository},
};
use uuid::Uuid;

// --- Test Context and Setup ---

async fn setup() -> PostgresRepository {
    dotenv::dotenv().ok();

    let config = AppConfig {
        db_url: std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests"),
        ..AppConfig::default()
    };

    PostgresRepository::connect(&config)
        .await
        .expect("Failed to connect and migrate")
}

/// A unique author per test keeps runs independent on a shared database.
fn unique_email() -> String {
    format!("{}@it.example.com", Uuid::new_v4())
}

fn article(author_email: &str, title: &str, tags: &[&str]) -> Article {
    let now = Utc::now();
    Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: "Integration body".to_string(),
        category: Category::Science,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        thumbnail_url: None,
        date: now,
        author_email: author_email.to_string(),
        author_name: "IT".to_string(),
        likes: Vec::new(),
        created_at: now,
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_email_is_unique() {
    let repo = setup().await;
    let email = unique_email();
    let user = User {
        id: Uuid::new_v4(),
        name: "First".to_string(),
        email: email.clone(),
        password_hash: "hash".to_string(),
    };

    assert!(repo.create_user(user.clone()).await.unwrap().is_some());

    let duplicate = User {
        id: Uuid::new_v4(),
        ..user
    };
    assert!(repo.create_user(duplicate).await.unwrap().is_none());
    assert_eq!(
        repo.find_user_by_email(&email).await.unwrap().unwrap().name,
        "First"
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_article_round_trip_and_filters() {
    let repo = setup().await;
    let email = unique_email();

    let created = repo
        .insert_article(article(&email, "Tagged", &["pg", "rust"]))
        .await
        .unwrap();
    repo.insert_article(article(&email, "Untagged", &[]))
        .await
        .unwrap();

    let fetched = repo.get_article(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.category, Category::Science);
    assert_eq!(fetched.tags, vec!["pg", "rust"]);

    let by_tag = repo
        .list_articles(ArticleQuery {
            tag: Some("pg".to_string()),
            author_email: Some(email.clone()),
            ..ArticleQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, created.id);

    let mine = repo
        .list_articles(ArticleQuery {
            author_email: Some(email),
            ..ArticleQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_writes_are_conditioned_on_owner() {
    let repo = setup().await;
    let owner = unique_email();
    let created = repo
        .insert_article(article(&owner, "Owned", &[]))
        .await
        .unwrap();

    let mut edited = created.clone();
    edited.title = "Edited".to_string();

    assert!(repo
        .update_article(edited.clone(), "someone@else.com")
        .await
        .unwrap()
        .is_none());
    assert!(!repo.delete_article(created.id, "someone@else.com").await.unwrap());

    let updated = repo.update_article(edited, &owner).await.unwrap().unwrap();
    assert_eq!(updated.title, "Edited");
    assert!(repo.delete_article(created.id, &owner).await.unwrap());
    assert!(repo.get_article(created.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_toggle_like_is_atomic_per_user() {
    let repo = setup().await;
    let created = repo
        .insert_article(article(&unique_email(), "Likes", &[]))
        .await
        .unwrap();

    let first = repo.toggle_like(created.id, "fan@example.com").await.unwrap().unwrap();
    assert!(first.liked);
    assert_eq!(first.likes, 1);

    let second = repo.toggle_like(created.id, "fan@example.com").await.unwrap().unwrap();
    assert!(!second.liked);
    assert_eq!(second.likes, 0);

    assert!(repo.toggle_like(Uuid::new_v4(), "fan@example.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_comments_need_no_parent_article() {
    let repo = setup().await;
    let orphan = Uuid::new_v4();

    repo.insert_comment(Comment {
        id: Uuid::new_v4(),
        article_id: orphan,
        user_name: "IT".to_string(),
        user_email: unique_email(),
        user_photo: None,
        comment: "orphaned".to_string(),
        date: Utc::now(),
    })
    .await
    .unwrap();

    let comments = repo.list_comments(orphan).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment, "orphaned");
}
