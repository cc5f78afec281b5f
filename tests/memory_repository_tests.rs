use chrono::{TimeZone, Utc};
use knowledge_hub::{
    InMemoryRepository, Repository,
    models::{Article, Category, Comment},
    repository::ArticleQuery,
};
use uuid::Uuid;

fn article_at(id: Uuid, author_email: &str, author_name: &str) -> Article {
    let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Article {
        id,
        title: format!("Article {}", id),
        content: "Body".to_string(),
        category: Category::Science,
        date: instant,
        author_email: author_email.to_string(),
        author_name: author_name.to_string(),
        created_at: instant,
        ..Article::default()
    }
}

fn sorted_ids(count: usize) -> (Vec<Uuid>, Vec<Uuid>) {
    let ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    (ids, sorted)
}

#[tokio::test]
async fn test_articles_with_equal_creation_time_are_ordered_by_id() {
    let repo = InMemoryRepository::new();
    let (ids, expected) = sorted_ids(6);
    for id in &ids {
        repo.insert_article(article_at(*id, "same@example.com", "Same"))
            .await
            .unwrap();
    }

    let listed: Vec<Uuid> = repo
        .list_articles(ArticleQuery::default())
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(listed, expected);

    let featured: Vec<Uuid> = repo
        .top_liked_articles(10)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(featured, expected);
}

#[tokio::test]
async fn test_comments_with_equal_date_are_ordered_by_id() {
    let repo = InMemoryRepository::new();
    let article_id = Uuid::new_v4();
    let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let (ids, expected) = sorted_ids(5);
    for id in &ids {
        repo.insert_comment(Comment {
            id: *id,
            article_id,
            user_name: "Reader".to_string(),
            user_email: "reader@example.com".to_string(),
            user_photo: None,
            comment: "same instant".to_string(),
            date: instant,
        })
        .await
        .unwrap();
    }

    let listed: Vec<Uuid> = repo
        .list_comments(article_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(listed, expected);
}

#[tokio::test]
async fn test_contributor_name_tie_is_broken_by_lowest_id() {
    let (ids, sorted) = sorted_ids(4);
    let names = ["Name A", "Name B", "Name C", "Name D"];

    // Same author, same creation time, a different byline per article.
    for _ in 0..5 {
        let repo = InMemoryRepository::new();
        for (id, name) in ids.iter().zip(names) {
            repo.insert_article(article_at(*id, "author@example.com", name))
                .await
                .unwrap();
        }

        let contributors = repo.top_contributors(10).await.unwrap();

        let lowest = ids.iter().position(|id| *id == sorted[0]).unwrap();
        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].total_articles, 4);
        assert_eq!(contributors[0].name, names[lowest]);
    }
}
