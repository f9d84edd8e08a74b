pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use models::ArticleGenerator;
pub use storage::ArticleStorage;
pub use types::{
    word_count, Article, Category, GeneratedArticle, GenerationLogEntry, LogStatus, NewArticle,
    DEFAULT_CATEGORIES,
};
