use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use ng_core::{
    Article, ArticleStorage, Category, Error, GenerationLogEntry, LogStatus, NewArticle, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        image_url TEXT NOT NULL,
        word_count INTEGER NOT NULL,
        view_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS news_articles_category_created
        ON news_articles (category, created_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS generation_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category TEXT NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

const ARTICLE_COLUMNS: &str =
    "id, title, content, category, image_url, word_count, view_count, created_at";

/// Fixed-width UTC timestamps so that text comparison orders them correctly.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", value, e)))
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        category: Category::new(row.get::<String, _>("category")),
        image_url: row.get("image_url"),
        word_count: row.get("word_count"),
        view_count: row.get("view_count"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn log_from_row(row: &SqliteRow) -> Result<GenerationLogEntry> {
    let status: String = row.get("status");
    Ok(GenerationLogEntry {
        id: row.get("id"),
        category: Category::new(row.get::<String, _>("category")),
        status: LogStatus::parse(&status)
            .ok_or_else(|| Error::Database(format!("Unknown log status: {}", status)))?,
        error_message: row.get("error_message"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

pub struct SQLiteStorage {
    pool: SqlitePool,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be reachable through DATABASE_URL"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        let url = url.ok_or_else(|| {
            Error::Configuration("DATABASE_URL not configured".to_string())
        })?;
        Self::new_with_url(url).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new_with_url(&format!("sqlite:{}", db_path.display())).await
    }

    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_error("Invalid database url"))?
            .create_if_missing(true);

        // An in-memory database lives and dies with its single connection.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool })
    }

    pub async fn insert_article_at(&self, article: &NewArticle, created_at: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO news_articles
            (title, content, category, image_url, word_count, view_count, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.category.as_str())
        .bind(&article.image_url)
        .bind(article.word_count)
        .bind(timestamp(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to store article"))?;

        Ok(row.get("id"))
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn recent_articles(&self, category: &Category, limit: usize) -> Result<Vec<Article>> {
        self.list_articles(Some(category), limit).await
    }

    async fn has_recent(&self, category: &Category, window: Duration) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM news_articles
            WHERE category = ? AND created_at > ?
            "#,
        )
        .bind(category.as_str())
        .bind(timestamp(Utc::now() - window))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check recent generation"))?;

        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<i64> {
        self.insert_article_at(article, Utc::now()).await
    }

    async fn insert_log(
        &self,
        category: &Category,
        status: LogStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO generation_log (category, status, error_message, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(category.as_str())
        .bind(status.as_str())
        .bind(error_message)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to write generation log"))?;

        Ok(())
    }

    async fn list_articles(&self, category: Option<&Category>, limit: usize) -> Result<Vec<Article>> {
        let filter = if category.is_some() { "WHERE category = ?" } else { "" };
        let sql = format!(
            "SELECT {} FROM news_articles {} ORDER BY created_at DESC, id DESC LIMIT ?",
            ARTICLE_COLUMNS, filter
        );

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category.as_str());
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list articles"))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let sql = format!("SELECT {} FROM news_articles WHERE id = ?", ARTICLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get article"))?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<GenerationLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, status, error_message, created_at FROM generation_log
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to read generation log"))?;

        rows.iter().map(log_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::GeneratedArticle;
    use tempfile::tempdir;

    fn article(title: &str, content: &str, category: &str) -> NewArticle {
        NewArticle::new(
            GeneratedArticle {
                title: title.to_string(),
                content: content.to_string(),
            },
            Category::new(category),
            "https://picsum.photos/seed/abc/1200/630",
        )
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("news.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
        let crypto = Category::new("Криптовалюта");

        let older = storage
            .insert_article_at(&article("Биткоин", "раз два три", "Криптовалюта"), Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        let newer = storage
            .insert_article(&article("Эфир", "четыре пять", "Криптовалюта"))
            .await
            .unwrap();
        storage.insert_article(&article("Go 2.0", "gophers", "IT")).await.unwrap();

        let recent = storage.recent_articles(&crypto, 20).await.unwrap();
        assert_eq!(recent.iter().map(|a| a.id).collect::<Vec<_>>(), vec![newer, older]);
        assert_eq!(recent[0].word_count, 2);
        assert_eq!(recent[0].view_count, 0);
        assert_eq!(recent[1].title, "Биткоин");

        assert_eq!(storage.list_articles(None, 100).await.unwrap().len(), 3);
        assert_eq!(storage.list_articles(None, 1).await.unwrap().len(), 1);

        let fetched = storage.get_article(older).await.unwrap().unwrap();
        assert_eq!(fetched.category, crypto);
        assert!(storage.get_article(older + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_has_recent() {
        let storage = SQLiteStorage::new_with_url("sqlite::memory:").await.unwrap();
        let world = Category::new("Мир");
        assert!(!storage.has_recent(&world, Duration::minutes(5)).await.unwrap());

        storage
            .insert_article_at(&article("old", "old news", "Мир"), Utc::now() - Duration::minutes(30))
            .await
            .unwrap();
        assert!(!storage.has_recent(&world, Duration::minutes(5)).await.unwrap());

        storage
            .insert_article_at(&article("fresh", "fresh news", "Мир"), Utc::now() - Duration::minutes(2))
            .await
            .unwrap();
        assert!(storage.has_recent(&world, Duration::minutes(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_generation_log() {
        let storage = SQLiteStorage::new_with_url("sqlite::memory:").await.unwrap();
        let finance = Category::new("Финансы");
        storage.insert_log(&finance, LogStatus::Success, None).await.unwrap();
        storage
            .insert_log(&finance, LogStatus::Error, Some("timeout"))
            .await
            .unwrap();

        let logs = storage.recent_logs(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, LogStatus::Error);
        assert_eq!(logs[0].error_message.as_deref(), Some("timeout"));
        assert_eq!(logs[1].status, LogStatus::Success);
        assert_eq!(logs[1].category, finance);
    }
}
