use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels used by the deployed feed.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["IT", "Криптовалюта", "Игры", "Финансы", "Мир"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn defaults() -> Vec<Category> {
        DEFAULT_CATEGORIES.iter().map(|c| Category::new(*c)).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub image_url: String,
    pub word_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// What the generation model hands back before anything is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    pub content: String,
}

/// Insert payload for the article store. Storage assigns `id`, `view_count` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub image_url: String,
    pub word_count: i64,
}

impl NewArticle {
    /// Builds the payload, recomputing the word count from the content.
    pub fn new(
        generated: GeneratedArticle,
        category: Category,
        image_url: impl Into<String>,
    ) -> Self {
        let word_count = word_count(&generated.content);
        Self {
            title: generated.title,
            content: generated.content,
            category,
            image_url: image_url.into(),
            word_count,
        }
    }
}

/// Whitespace-token count.
pub fn word_count(content: &str) -> i64 {
    content.split_whitespace().count() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(LogStatus::Success),
            "error" => Some(LogStatus::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLogEntry {
    pub id: i64,
    pub category: Category,
    pub status: LogStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
