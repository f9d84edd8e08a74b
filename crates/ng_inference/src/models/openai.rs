use async_trait::async_trait;
use ng_core::{ArticleGenerator, Category, Error, GeneratedArticle, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;
use crate::prompt::{parse_article_payload, user_prompt, SYSTEM_PROMPT};
use crate::Config;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Chat-completion client for OpenAI-compatible endpoints.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Configuration("OPENAI_API_KEY not configured".to_string()))?;

        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{}/chat/completions", base))
            .map_err(|e| Error::Configuration(format!("Invalid API base url {}: {}", base, e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: config.model_name().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ArticleGenerator for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, category: &Category, recent_titles: &[String]) -> Result<GeneratedArticle> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(category, recent_titles),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Requesting {} article from {}", category, self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Generation(format!("OpenAI API error: {}", body)));
        }

        let completion: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Unexpected completion response: {}", e)))?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Parse("Completion response has no choices".to_string()))?;

        parse_article_payload(&choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            captured.lock().unwrap().push(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), captured)
    }

    fn config(base_url: &str) -> Config {
        Config::default()
            .with_api_key(Some("test-key".to_string()))
            .with_base_url(base_url)
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = OpenAiModel::new(&Config::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(OpenAiModel::new(&config(crate::DEFAULT_BASE_URL)).is_ok());
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_payload() {
        let content = "```json\n{\"title\": \"Rust 2.0\", \"content\": \"Большая статья о Rust\"}\n```";
        let (base_url, captured) = spawn_stub(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }),
        )
        .await;

        let model = OpenAiModel::new(&config(&base_url)).unwrap();
        let article = model
            .generate(&Category::new("IT"), &["Old news".to_string()])
            .await
            .unwrap();
        assert_eq!(article.title, "Rust 2.0");
        assert_eq!(article.content, "Большая статья о Rust");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request["model"], "gpt-4o-mini");
        assert_eq!(request["max_tokens"], 16000);
        assert!((request["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(request["messages"][0]["role"], "system");
        assert!(request["messages"][1]["content"].as_str().unwrap().contains("- Old news"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_generation_error() {
        let (base_url, _) =
            spawn_stub(StatusCode::TOO_MANY_REQUESTS, json!({ "error": "quota exceeded" })).await;

        let model = OpenAiModel::new(&config(&base_url)).unwrap();
        let err = model.generate(&Category::new("IT"), &[]).await.unwrap_err();
        match err {
            Error::Generation(message) => {
                assert!(message.starts_with("OpenAI API error: "));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unusable_completion_is_parse_error() {
        let (base_url, _) = spawn_stub(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "Извините, не могу." } }] }),
        )
        .await;
        let model = OpenAiModel::new(&config(&base_url)).unwrap();
        let err = model.generate(&Category::new("IT"), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let (base_url, _) = spawn_stub(StatusCode::OK, json!({ "choices": [] })).await;
        let model = OpenAiModel::new(&config(&base_url)).unwrap();
        let err = model.generate(&Category::new("IT"), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
