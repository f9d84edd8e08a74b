use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ng_core::{Article, Category, Error, NewArticle};
use ng_generator::{BatchOrchestrator, BatchReport};
use ng_inference::images::image_url_for;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use crate::AppState;

pub const DEFAULT_LIST_LIMIT: usize = 100;

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Generation(_) | Error::Parse(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Article>> {
    let category = query.category.filter(|c| !c.is_empty()).map(Category::new);
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let articles = state.storage.list_articles(category.as_ref(), limit).await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Article> {
    let article = state
        .storage
        .get_article(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Article {} not found", id)))?;
    Ok(Json(article))
}

/// Generate and store one article for a random configured category.
pub async fn generate_article(State(state): State<Arc<AppState>>) -> ApiResult<Article> {
    let category = {
        let mut rng = rand::thread_rng();
        state.config.categories.choose(&mut rng).cloned()
    }
    .ok_or_else(|| Error::Configuration("No categories configured".to_string()))?;

    let generated = state.article_generator.generate(&category, &[]).await?;
    let image_url = image_url_for(&generated.title);
    let id = state
        .storage
        .insert_article(&NewArticle::new(generated, category.clone(), image_url))
        .await?;
    info!("🆕 Generated article {} for {}", id, category);

    let article = state
        .storage
        .get_article(id)
        .await?
        .ok_or_else(|| Error::Storage(format!("Article {} vanished after insert", id)))?;
    Ok(Json(article))
}

/// Run one batch generation pass.
pub async fn auto_generate(State(state): State<Arc<AppState>>) -> ApiResult<BatchReport> {
    let generator = state
        .batch_generator
        .clone()
        .ok_or_else(|| Error::Configuration("OPENAI_API_KEY not configured".to_string()))?;
    let orchestrator = BatchOrchestrator::new(state.storage.clone(), generator, state.config.clone())?;
    Ok(Json(orchestrator.run().await))
}
