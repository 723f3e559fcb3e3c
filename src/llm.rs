use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::BackendConfig;
use crate::error::{AppError, Result};
use crate::extract::ExtractedContent;

/// Turns extracted page text into a markdown summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &ExtractedContent) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

pub fn build_prompt(text: &str, source_url: &str) -> String {
    let mut result = String::with_capacity(text.len() + source_url.len() + 256);
    result.push_str("You are a summarizer. I have scraped the following text from ");
    result.push_str(source_url);
    result.push_str(
        ". Summarize it concisely in markdown format, using bullet points and grouping related points under topic headings:\n\n",
    );
    result.push_str(text);
    result
}

/// Client for an Ollama-compatible `/api/generate` endpoint, non-streaming.
pub struct OllamaClient {
    client: Client,
    config: BackendConfig,
}

impl OllamaClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build backend client: {}", e)))?;

        Ok(OllamaClient { client, config })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.num_predict,
            },
        };

        let res = self
            .client
            .post(self.config.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SummarizationFailed(format!("Ollama request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            return Err(AppError::SummarizationFailed(format!(
                "Ollama request failed: {} {}",
                status.as_u16(),
                error_text
            )));
        }

        let json: GenerateResponse = res
            .json()
            .await
            .map_err(|e| AppError::SummarizationFailed(format!("Invalid response from Ollama: {}", e)))?;

        json.response
            .map(|reply| reply.trim().to_string())
            .ok_or_else(|| AppError::SummarizationFailed("Ollama response is missing the `response` field".to_string()))
    }
}

#[async_trait]
impl Summarizer for OllamaClient {
    async fn summarize(&self, content: &ExtractedContent) -> Result<String> {
        let prompt = build_prompt(&content.text, &content.source_url);
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling generation backend");
        self.generate(&prompt).await
    }
}
