use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ng_core::{
    Article, ArticleStorage, Category, GenerationLogEntry, LogStatus, NewArticle, Result,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    logs: Vec<GenerationLogEntry>,
    next_article_id: i64,
    next_log_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_article(&mut self, article: &NewArticle, created_at: DateTime<Utc>) -> i64 {
        self.next_article_id += 1;
        self.articles.push(Article {
            id: self.next_article_id,
            title: article.title.clone(),
            content: article.content.clone(),
            category: article.category.clone(),
            image_url: article.image_url.clone(),
            word_count: article.word_count,
            view_count: 0,
            created_at,
        });
        self.next_article_id
    }

    pub fn insert_log(&mut self, category: &Category, status: LogStatus, error_message: Option<&str>) {
        self.next_log_id += 1;
        self.logs.push(GenerationLogEntry {
            id: self.next_log_id,
            category: category.clone(),
            status,
            error_message: error_message.map(str::to_string),
            created_at: Utc::now(),
        });
    }

    /// Newest first; ids break ties between equal timestamps.
    pub fn newest(&self, category: Option<&Category>, limit: usize) -> Vec<Article> {
        let mut articles = self
            .articles
            .iter()
            .filter(|a| category.map_or(true, |c| &a.category == c))
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        articles.truncate(limit);
        articles
    }

    pub fn has_recent(&self, category: &Category, window: Duration) -> bool {
        let cutoff = Utc::now() - window;
        self.articles
            .iter()
            .any(|a| &a.category == category && a.created_at > cutoff)
    }

    pub fn get_article(&self, id: i64) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn recent_logs(&self, limit: usize) -> Vec<GenerationLogEntry> {
        self.logs.iter().rev().take(limit).cloned().collect()
    }
}

/// Process-local article store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time, for seeding older content.
    pub async fn insert_article_at(&self, article: &NewArticle, created_at: DateTime<Utc>) -> i64 {
        let mut store = self.store.write().await;
        store.insert_article(article, created_at)
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn recent_articles(&self, category: &Category, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.newest(Some(category), limit))
    }

    async fn has_recent(&self, category: &Category, window: Duration) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.has_recent(category, window))
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<i64> {
        let mut store = self.store.write().await;
        Ok(store.insert_article(article, Utc::now()))
    }

    async fn insert_log(
        &self,
        category: &Category,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert_log(category, status, error_message);
        Ok(())
    }

    async fn list_articles(&self, category: Option<&Category>, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.newest(category, limit))
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get_article(id))
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<GenerationLogEntry>> {
        let store = self.store.read().await;
        Ok(store.recent_logs(limit))
    }
}
