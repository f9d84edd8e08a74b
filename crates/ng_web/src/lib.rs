use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Pre-flight probes are answered by the CORS layer and never reach a handler.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
}

pub async fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(handlers::list_articles))
        .route("/api/news/generate", post(handlers::generate_article))
        .route("/api/news/:id", get(handlers::get_article))
        .route(
            "/api/auto-generate",
            get(handlers::auto_generate).post(handlers::auto_generate),
        )
        .layer(cors())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: &str) -> ng_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use ng_core::{Article, Result, Error};
    pub use crate::AppState;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ng_core::{
        ArticleGenerator, ArticleStorage, Category, Error, GeneratedArticle, GeneratorConfig,
        NewArticle, Result,
    };
    use ng_inference::models::DemoModel;
    use ng_storage::InMemoryStorage;
    use serde_json::Value;
    use tower::ServiceExt;

    struct FailingGenerator;

    #[async_trait]
    impl ArticleGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn generate(&self, _category: &Category, _titles: &[String]) -> Result<GeneratedArticle> {
            Err(Error::Generation("OpenAI API error: nope".to_string()))
        }
    }

    fn state(storage: &InMemoryStorage, batch: Option<Arc<dyn ArticleGenerator>>) -> AppState {
        AppState {
            storage: Arc::new(storage.clone()),
            article_generator: Arc::new(DemoModel::new()),
            batch_generator: batch,
            config: GeneratorConfig::default()
                .with_categories(vec![Category::new("IT"), Category::new("Игры")]),
        }
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn seed(storage: &InMemoryStorage, title: &str, category: &str) -> i64 {
        let article = NewArticle::new(
            GeneratedArticle {
                title: title.to_string(),
                content: "short body".to_string(),
            },
            Category::new(category),
            "https://picsum.photos/seed/x/1200/630",
        );
        storage.insert_article(&article).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_and_get_articles() {
        let storage = InMemoryStorage::new();
        let id = seed(&storage, "Rust 2.0", "IT").await;
        seed(&storage, "GTA VII", "Игры").await;

        let app = create_app(state(&storage, None)).await;
        let (status, json) = send(app.clone(), Method::GET, "/api/news").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (_, json) = send(app.clone(), Method::GET, "/api/news?category=IT&limit=5").await;
        let articles = json.as_array().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["title"], "Rust 2.0");
        assert_eq!(articles[0]["view_count"], 0);

        let (status, json) = send(app.clone(), Method::GET, &format!("/api/news/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["category"], "IT");

        let (status, json) = send(app, Method::GET, "/api/news/4242").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("4242"));
    }

    #[tokio::test]
    async fn test_generate_article_with_demo_model() {
        let storage = InMemoryStorage::new();
        let app = create_app(state(&storage, None)).await;

        let (status, json) = send(app, Method::POST, "/api/news/generate").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["word_count"], 600);
        assert_eq!(storage.list_articles(None, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_generate_requires_api_key() {
        let storage = InMemoryStorage::new();
        let app = create_app(state(&storage, None)).await;

        let (status, json) = send(app, Method::POST, "/api/auto-generate").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
        assert!(storage.recent_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_generate_reports_per_category() {
        let storage = InMemoryStorage::new();
        seed(&storage, "GTA VII", "Игры").await;
        let app = create_app(state(&storage, Some(Arc::new(FailingGenerator)))).await;

        let (status, json) = send(app, Method::GET, "/api/auto-generate").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["generated"], 0);
        assert_eq!(json["results"][0]["category"], "IT");
        assert_eq!(json["results"][0]["status"], "error");
        assert_eq!(json["results"][0]["message"], "OpenAI API error: nope");
        assert_eq!(json["results"][1]["status"], "skipped");
        assert_eq!(json["results"][1]["message"], "Recently generated");
    }

    #[tokio::test]
    async fn test_options_probe_does_no_work() {
        let storage = InMemoryStorage::new();
        let app = create_app(state(&storage, Some(Arc::new(FailingGenerator)))).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/auto-generate")
                    .header("origin", "https://news.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-max-age"], "86400");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(storage.recent_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let storage = InMemoryStorage::new();
        let app = create_app(state(&storage, None)).await;
        let (status, _) = send(app, Method::DELETE, "/api/news").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
