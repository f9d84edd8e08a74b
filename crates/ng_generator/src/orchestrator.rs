use ng_core::{
    Article, ArticleGenerator, ArticleStorage, Category, Error, GeneratorConfig, LogStatus,
    NewArticle, Result,
};
use ng_inference::images::image_url_for;
use ng_inference::similarity::DuplicateGuard;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::logging::Logger;
use crate::throttle::recently_generated;

pub const RECENTLY_GENERATED: &str = "Recently generated";

/// Terminal state of one category within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Skipped { message: String },
    Success { article_id: i64, word_count: i64 },
    Error { message: String },
    /// Every attempt produced a duplicate
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub category: Category,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated: usize,
    pub results: Vec<CategoryOutcome>,
}

impl BatchReport {
    fn new(results: Vec<CategoryOutcome>) -> Self {
        let generated = results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Success { .. }))
            .count();
        Self { generated, results }
    }
}

struct StoredArticle {
    id: i64,
    word_count: i64,
}

/// Runs one generation pass over the configured categories, strictly one after another.
pub struct BatchOrchestrator {
    storage: Arc<dyn ArticleStorage>,
    generator: Arc<dyn ArticleGenerator>,
    guard: DuplicateGuard,
    config: GeneratorConfig,
    logger: Logger,
}

impl BatchOrchestrator {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        generator: Arc<dyn ArticleGenerator>,
        config: GeneratorConfig,
    ) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(Error::Configuration("max_attempts must be at least 1".to_string()));
        }
        Ok(Self {
            storage,
            generator,
            guard: DuplicateGuard::new(config.similarity_threshold),
            config,
            logger: Logger::new().with_prefix("🗞️"),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub async fn run(&self) -> BatchReport {
        self.logger.info(&format!(
            "Starting batch generation for {} categories with {}",
            self.config.categories.len(),
            self.generator.name()
        ));

        let mut results = Vec::with_capacity(self.config.categories.len());
        for category in &self.config.categories {
            let outcome = self.process_category(category).await;
            results.push(CategoryOutcome {
                category: category.clone(),
                outcome,
            });
        }

        let report = BatchReport::new(results);
        self.logger.info(&format!(
            "Batch finished: {}/{} categories generated",
            report.generated,
            report.results.len()
        ));
        report
    }

    async fn process_category(&self, category: &Category) -> Outcome {
        let log = self.logger.clone().with_prefix(format!("[{}]", category));

        match recently_generated(self.storage.as_ref(), category, self.config.cooldown).await {
            Ok(true) => {
                log.info("⏭️ Recently generated, skipping");
                return Outcome::Skipped {
                    message: RECENTLY_GENERATED.to_string(),
                };
            }
            Ok(false) => {}
            Err(e) => return self.record_error(category, &log, e).await,
        }

        let existing = match self
            .storage
            .recent_articles(category, self.config.recent_limit)
            .await
        {
            Ok(existing) => Arc::new(existing),
            Err(e) => return self.record_error(category, &log, e).await,
        };

        // Oldest first, so the newest titles are the ones kept.
        let mut titles: Vec<String> = existing.iter().rev().map(|a| a.title.clone()).collect();
        let excess = titles.len().saturating_sub(self.config.title_window);
        titles.drain(..excess);

        let attempts = self.config.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let last = attempt >= attempts;
            log.debug(&format!("Attempt {}/{}", attempt, attempts));

            match self.attempt(category, &titles, &existing, &log).await {
                Ok(Some(stored)) => {
                    log.info(&format!(
                        "✨ Stored article {} ({} words)",
                        stored.id, stored.word_count
                    ));
                    return Outcome::Success {
                        article_id: stored.id,
                        word_count: stored.word_count,
                    };
                }
                Ok(None) if last => {
                    log.warn(&format!("Duplicate content on all {} attempts", attempts));
                    return Outcome::Failed {
                        message: format!("Plagiarism check failed after {} attempts", attempts),
                    };
                }
                Ok(None) => {
                    log.warn(&format!("Attempt {} was too similar to an existing article", attempt));
                }
                Err(e) if last || !e.is_retryable() => {
                    return self.record_error(category, &log, e).await;
                }
                Err(e) => {
                    log.warn(&format!("Attempt {} failed: {}", attempt, e));
                    if !self.config.retry_delay.is_zero() {
                        tokio::time::sleep(self.config.retry_delay * attempt).await;
                    }
                }
            }
        }
    }

    /// One generation call plus validation. `None` means the result was a duplicate.
    async fn attempt(
        &self,
        category: &Category,
        titles: &[String],
        existing: &Arc<Vec<Article>>,
        log: &Logger,
    ) -> Result<Option<StoredArticle>> {
        let generated = self.generator.generate(category, titles).await?;

        let guard = self.guard;
        let content = generated.content.clone();
        let existing = Arc::clone(existing);
        let duplicate = tokio::task::spawn_blocking(move || guard.is_duplicate(&content, &existing))
            .await
            .map_err(|e| Error::External(e.into()))?;
        if duplicate {
            return Ok(None);
        }

        let image_url = image_url_for(&generated.title);
        let article = NewArticle::new(generated, category.clone(), image_url);
        let id = self.storage.insert_article(&article).await?;

        // The article is committed at this point; a missing log row must not cause a second one.
        if let Err(e) = self.storage.insert_log(category, LogStatus::Success, None).await {
            log.error(&format!("Failed to write success log: {}", e));
        }

        Ok(Some(StoredArticle {
            id,
            word_count: article.word_count,
        }))
    }

    async fn record_error(&self, category: &Category, log: &Logger, error: Error) -> Outcome {
        let message = error.to_string();
        log.error(&format!("❌ {}", message));
        if let Err(e) = self
            .storage
            .insert_log(category, LogStatus::Error, Some(&message))
            .await
        {
            log.error(&format!("Failed to write generation log: {}", e));
        }
        Outcome::Error { message }
    }
}
