use ng_core::{ArticleGenerator, ArticleStorage, GeneratorConfig};
use std::sync::Arc;

pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    /// Generator for single on-demand articles; may be the demo model
    pub article_generator: Arc<dyn ArticleGenerator>,
    /// Generator for batch runs; `None` when no API key is configured
    pub batch_generator: Option<Arc<dyn ArticleGenerator>>,
    pub config: GeneratorConfig,
}
