use async_trait::async_trait;
use crate::types::{Category, GeneratedArticle};
use crate::Result;

#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Write a fresh article for `category`, steering away from `recent_titles`
    async fn generate(&self, category: &Category, recent_titles: &[String]) -> Result<GeneratedArticle>;
}
