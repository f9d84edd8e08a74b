use chrono::Duration;
use ng_core::{ArticleStorage, Category, Result};

/// Whether `category` already produced an article inside the cooldown `window`.
///
/// Best effort only: two runs that check before either writes will both see `false`.
pub async fn recently_generated(
    storage: &dyn ArticleStorage,
    category: &Category,
    window: Duration,
) -> Result<bool> {
    storage.has_recent(category, window).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ng_core::{GeneratedArticle, NewArticle};
    use ng_storage::InMemoryStorage;

    fn article(category: &Category) -> NewArticle {
        NewArticle::new(
            GeneratedArticle {
                title: "t".to_string(),
                content: "c".to_string(),
            },
            category.clone(),
            "",
        )
    }

    #[tokio::test]
    async fn test_recently_generated() {
        let storage = InMemoryStorage::new();
        let it = Category::new("IT");
        let window = Duration::minutes(5);

        assert!(!recently_generated(&storage, &it, window).await.unwrap());

        storage
            .insert_article_at(&article(&it), Utc::now() - Duration::minutes(6))
            .await;
        assert!(!recently_generated(&storage, &it, window).await.unwrap());

        storage.insert_article(&article(&it)).await.unwrap();
        assert!(recently_generated(&storage, &it, window).await.unwrap());
        assert!(!recently_generated(&storage, &Category::new("Мир"), window).await.unwrap());
    }
}
