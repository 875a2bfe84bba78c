use crate::services::generator::RetryConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String, // "openai" or "ollama"
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub retry: RetryConfig,
    pub openai: Option<OpenAIConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    /// Falls back to `OPENAI_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    pub model: String,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_timeout_seconds() -> u64 {
    600
}
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            timeout_seconds: default_timeout_seconds(),
            temperature: None,
            retry: RetryConfig::default(),
            openai: None,
            ollama: None,
        }
    }
}

// --- Errors ---

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    RateLimited,
    Server,
    Auth,
    InvalidResponse,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Timeout,
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Auth,
            s if s.is_server_error() => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }

    /// Finds the kind of the first classifiable cause in an error chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<LlmError>() {
                return e.kind;
            }
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                if e.is_timeout() {
                    return ErrorKind::Timeout;
                }
                if e.is_decode() {
                    return ErrorKind::InvalidResponse;
                }
                if let Some(status) = e.status() {
                    return ErrorKind::from_status(status);
                }
            }
        }
        ErrorKind::Other
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::Server => "server error",
            ErrorKind::Auth => "authentication error",
            ErrorKind::InvalidResponse => "invalid response",
            ErrorKind::Other => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmError {
    pub kind: ErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for LlmError {}

// --- Client ---

#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Sends `prompt` as a single user message and returns the completion text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub fn create_llm(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .context("Failed to build HTTP client")?;

    match config.provider.as_str() {
        "openai" => {
            let cfg = config.openai.as_ref().context("OpenAI config missing")?;
            let api_key = if cfg.api_key.is_empty() {
                std::env::var(OPENAI_KEY_ENV).with_context(|| {
                    format!("OpenAI API key missing: set llm.openai.api_key or {}", OPENAI_KEY_ENV)
                })?
            } else {
                cfg.api_key.clone()
            };
            Ok(Box::new(OpenAIClient::new(
                http,
                &api_key,
                &cfg.model,
                cfg.base_url.as_deref(),
                config.temperature,
            )?))
        }
        "ollama" => {
            let cfg = config.ollama.as_ref().context("Ollama config missing")?;
            Ok(Box::new(OllamaClient::new(
                http,
                &cfg.base_url,
                &cfg.model,
                config.temperature,
            )?))
        }
        _ => Err(anyhow!("Unknown LLM provider: {}", config.provider)),
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&base)
        .with_context(|| format!("Invalid base URL: {}", base_url))?
        .join(path)?;
    Ok(url)
}

/// Sends a prepared request and decodes the JSON body, tagging failures with an [`ErrorKind`].
async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<T> {
    let resp = request.send().await?;

    let status = resp.status();
    if !status.is_success() {
        let error_text = resp.text().await.unwrap_or_default();
        return Err(LlmError::new(
            ErrorKind::from_status(status),
            format!("{} API error ({}): {}", provider, status, error_text),
        )
        .into());
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        LlmError::new(
            ErrorKind::InvalidResponse,
            format!("Failed to parse {} response: {}. Body: {}", provider, e, body),
        )
        .into()
    })
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

// --- OpenAI ---

#[derive(Debug)]
struct OpenAIClient {
    api_key: String,
    model: String,
    url: Url,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OpenAIClient {
    fn new(
        client: reqwest::Client,
        api_key: &str,
        model: &str,
        base_url: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            url: endpoint(base_url.unwrap_or(OPENAI_BASE_URL), "chat/completions")?,
            temperature,
            client,
        })
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

impl OpenAIResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::new(
                    ErrorKind::InvalidResponse,
                    "OpenAI response empty or missing content",
                )
                .into()
            })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
        };

        let request = self
            .client
            .post(self.url.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body);

        let result: OpenAIResponse = send_json(request, "OpenAI").await?;
        result.into_content()
    }
}

// --- Ollama ---

#[derive(Debug)]
struct OllamaClient {
    model: String,
    url: Url,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OllamaClient {
    fn new(
        client: reqwest::Client,
        base_url: &str,
        model: &str,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            model: model.to_string(),
            url: endpoint(base_url, "api/chat")?,
            temperature,
            client,
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessageResponse,
}

#[derive(Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = OllamaRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
            options: self.temperature.map(|temperature| OllamaOptions { temperature }),
        };

        let request = self.client.post(self.url.clone()).json(&request_body);

        let result: OllamaResponse = send_json(request, "Ollama").await?;
        Ok(result.message.content)
    }
}
