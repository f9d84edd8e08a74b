use std::time::Duration;
use crate::types::Category;

/// Knobs of a batch generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Categories processed in order on every run
    pub categories: Vec<Category>,
    /// A category with an article younger than this is skipped
    pub cooldown: chrono::Duration,
    /// How many existing articles feed the novelty prompt and the duplicate guard
    pub recent_limit: usize,
    /// How many of those titles are listed in the prompt
    pub title_window: usize,
    pub max_attempts: u32,
    /// Similarity above which a generated article counts as a duplicate
    pub similarity_threshold: f64,
    /// Pause between a failed attempt and the next one
    pub retry_delay: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            categories: Category::defaults(),
            cooldown: chrono::Duration::minutes(5),
            recent_limit: 20,
            title_window: 10,
            max_attempts: 3,
            similarity_threshold: 0.7,
            retry_delay: Duration::ZERO,
        }
    }
}

impl GeneratorConfig {
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_cooldown(mut self, cooldown: chrono::Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
