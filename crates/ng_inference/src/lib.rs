use std::time::Duration;

pub mod images;
pub mod models;
pub mod prompt;
pub mod similarity;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: String,
    /// High on purpose: topic diversity matters more than determinism here
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.9,
            max_tokens: 16000,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::images::image_url_for;
    pub use super::models::{create_model, create_model_or_demo, DemoModel, OpenAiModel};
    pub use super::similarity::{similarity, DuplicateGuard};
    pub use ng_core::{ArticleGenerator, GeneratedArticle, Result, Error};
}

pub use models::{create_model, create_model_or_demo};
