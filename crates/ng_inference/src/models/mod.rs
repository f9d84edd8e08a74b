use ng_core::{ArticleGenerator, Error, Result};
use std::sync::Arc;
use tracing::info;
use crate::Config;

pub mod demo;
pub mod openai;

pub use demo::DemoModel;
pub use openai::OpenAiModel;

/// Build the generator named by `config.model_name`.
///
/// `demo` never needs a key. Anything else is sent to the chat-completion endpoint
/// as the model identifier, which requires an API key.
pub fn create_model(config: &Config) -> Result<Arc<dyn ArticleGenerator>> {
    let model: Arc<dyn ArticleGenerator> = match config.model_name.as_deref() {
        Some("demo") => Arc::new(DemoModel::new()),
        _ => Arc::new(OpenAiModel::new(config)?),
    };
    info!("Using {} article generator ({})", model.name(), config.model_name());
    Ok(model)
}

/// Like [`create_model`], but falls back to the demo generator when no key is configured.
pub fn create_model_or_demo(config: &Config) -> Result<Arc<dyn ArticleGenerator>> {
    match create_model(config) {
        Err(Error::Configuration(reason)) if config.api_key.is_none() => {
            info!("{}; falling back to demo articles", reason);
            Ok(Arc::new(DemoModel::new()))
        }
        other => other,
    }
}
