use crate::error::CompletionError;
use crate::models::{Completion, CompletionOptions, TokenUsage};
use crate::prompt::probe_request;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn from_options(options: &CompletionOptions, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: options.model.clone(),
            messages,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_output_tokens,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            stream: options.stream,
        }
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::NotConfigured(
                "api key is empty".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            endpoint: completions_endpoint(base_url)?,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        debug!(endpoint = %self.endpoint, model = %request.model, "completion request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

pub async fn check_connection(
    backend: &dyn CompletionBackend,
    options: &CompletionOptions,
) -> Result<Completion, CompletionError> {
    backend.complete(&probe_request(options)).await
}

fn completions_endpoint(base_url: &str) -> Result<Url, CompletionError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let base = Url::parse(&format!("{trimmed}/"))?;
    base.join("chat/completions").map_err(CompletionError::from)
}

fn parse_completion(body: &str) -> Result<Completion, CompletionError> {
    let payload: ChatCompletionResponse = serde_json::from_str(body)?;
    let choice = payload
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Parse("response has no choices".to_string()))?;

    let text = choice
        .message
        .and_then(|message| message.content)
        .ok_or_else(|| CompletionError::Parse("missing choices[0].message.content".to_string()))?;

    Ok(Completion {
        text,
        model: payload.model,
        finish_reason: choice.finish_reason,
        usage: payload.usage,
    })
}
