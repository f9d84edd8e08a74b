use async_trait::async_trait;
use chrono::Duration;
use crate::types::{Article, Category, GenerationLogEntry, LogStatus, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Most recent articles of a category, newest first
    async fn recent_articles(&self, category: &Category, limit: usize) -> Result<Vec<Article>>;

    /// Whether the category got an article within the last `window`
    async fn has_recent(&self, category: &Category, window: Duration) -> Result<bool>;

    /// Store a new article and return the id assigned to it
    async fn insert_article(&self, article: &NewArticle) -> Result<i64>;

    /// Append an entry to the generation log
    async fn insert_log(
        &self,
        category: &Category,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<()>;

    /// Articles across all categories (or one), newest first
    async fn list_articles(&self, category: Option<&Category>, limit: usize) -> Result<Vec<Article>>;

    async fn get_article(&self, id: i64) -> Result<Option<Article>>;

    /// Generation log entries, newest first
    async fn recent_logs(&self, limit: usize) -> Result<Vec<GenerationLogEntry>>;
}
