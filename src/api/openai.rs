use crate::config::ChatConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const BODY_SNIPPET_CHARS: usize = 800;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion service error ({kind}): {message}")]
    Api { kind: String, message: String },
    #[error("malformed completion response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("completion response has no choices")]
    NoChoices,
}

/// Text-completion backend used by the chat loop.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Fixed sampling parameters sent with every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, params: GenerationParams) -> Self {
        Self {
            model,
            prompt,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorRoot {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

fn snippet(raw: &str) -> String {
    raw.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Pulls the first choice's text out of a completion response body.
pub fn extract_completion_text(status: u16, raw: &str) -> Result<String, CompletionError> {
    if let Ok(root) = serde_json::from_str::<ErrorRoot>(raw) {
        let kind = root.error.kind.unwrap_or_else(|| "unknown".to_string());
        warn!("OpenAI error type: {}", kind);
        return Err(CompletionError::Api {
            kind,
            message: root.error.message,
        });
    }

    if !(200..300).contains(&status) {
        return Err(CompletionError::Status {
            status,
            body: snippet(raw),
        });
    }

    let resp: CompletionResponse = serde_json::from_str(raw)?;
    resp.choices
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or(CompletionError::NoChoices)
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    params: GenerationParams,
}

impl OpenAiClient {
    /// No request timeout is set: a stalled service stalls the caller.
    pub fn new(cfg: &ChatConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.clone(),
            params: GenerationParams::default(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = CompletionRequest::new(&self.model, prompt, self.params);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "sending completion request");

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            warn!("OpenAI HTTP {}", status.as_u16());
        }
        extract_completion_text(status.as_u16(), &raw)
    }
}
