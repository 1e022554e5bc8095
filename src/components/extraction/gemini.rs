use crate::error::{fetch_error, llm_error, AppResult, Error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

/// Header carrying the API key, so it never shows up in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Sends a prompt to a language model
#[async_trait]
pub trait EventExtractor: Send + Sync {
    /// Run `prompt` and return the model's JSON reply as-is
    async fn extract(&self, prompt: &str) -> AppResult<Value>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_base: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl EventExtractor for GeminiClient {
    async fn extract(&self, prompt: &str) -> AppResult<Value> {
        info!("Sending {} characters to Gemini model {}", prompt.len(), self.model);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the API's own message, fall back to the reason phrase
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            error!("Gemini API returned {}: {}", status, message);
            return Err(llm_error(status.as_u16(), &message));
        }

        response.json::<Value>().await.map_err(transport_error)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    // Error text must not echo the request URL back to clients
    let e = e.without_url();
    error!("Gemini request failed: {}", e);
    fetch_error(&format!("Failed to reach Gemini API: {}", e))
}
