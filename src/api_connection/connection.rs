use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::env;
use std::error::Error;
use std::fmt;
use tracing::{debug, error};

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, JsonSchemaDefinition, Provider,
    ProviderKind, ResponseFormat,
};

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: StatusCode,
        error_body: String,
    },
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found; set {} or save one in settings", key_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// What an HTTP error from the model endpoint means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Credential,
    ModelNotFound,
    Other,
}

/// Classifies a non-success response. Providers disagree on status codes
/// (Google answers a bad key with 400), so the body is checked as well.
pub fn classify_api_error(status: StatusCode, error_body: &str) -> ApiErrorKind {
    let body = error_body.to_ascii_lowercase();
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("api key not valid")
        || body.contains("api_key_invalid")
        || body.contains("invalid api key")
    {
        return ApiErrorKind::Credential;
    }
    if status == StatusCode::NOT_FOUND
        || body.contains("model not found")
        || (body.contains("model") && body.contains("is not found"))
    {
        return ApiErrorKind::ModelNotFound;
    }
    ApiErrorKind::Other
}

impl ApiConnectionError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiConnectionError::MissingApiKey(_) => ApiErrorKind::Credential,
            ApiConnectionError::ApiError { status, error_body } => {
                classify_api_error(*status, error_body)
            }
            _ => ApiErrorKind::Other,
        }
    }
}

/// A hosted model that answers a prompt with JSON shaped by a schema.
///
/// `Ok(None)` means the model replied but produced no content.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        schema: &JsonSchemaDefinition,
    ) -> Result<Option<String>, ApiConnectionError>;
}

impl Provider {
    pub fn new(kind: ProviderKind, api_key: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| kind.default_base_url().to_string());
        match kind {
            ProviderKind::Google => Provider::GoogleAi { api_key, base_url },
            ProviderKind::OpenRouter => Provider::OpenRouter { api_key, base_url },
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::GoogleAi { .. } => ProviderKind::Google,
            Provider::OpenRouter { .. } => ProviderKind::OpenRouter,
        }
    }

    fn api_key(&self) -> Option<&str> {
        match self {
            Provider::GoogleAi { api_key, .. } | Provider::OpenRouter { api_key, .. } => {
                api_key.as_deref().filter(|key| !key.trim().is_empty())
            }
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn completions_url(&self) -> String {
        let base_url = match self {
            Provider::GoogleAi { base_url, .. } | Provider::OpenRouter { base_url, .. } => base_url,
        };
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }

    pub async fn call_chat_completion(
        &self,
        client: &Client,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let api_key = self.api_key().ok_or_else(|| {
            ApiConnectionError::MissingApiKey(self.kind().api_key_env_var().to_string())
        })?;

        let mut builder = client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header("Content-Type", "application/json");

        if let Provider::OpenRouter { .. } = self {
            let site_url =
                env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
            let app_name = env::var("APP_NAME").unwrap_or_else(|_| "CalorieWise".to_string());
            builder = builder
                .header("HTTP-Referer", site_url)
                .header("X-Title", app_name);
        }

        debug!(model = %request.model, url = %self.completions_url(), "sending chat completion");
        let response = builder.json(request).send().await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, "model endpoint returned an error");
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

/// [`StructuredModel`] backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    provider: Provider,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http: Client,
}

impl ChatCompletionsClient {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: Some(0.4),
            max_tokens: Some(4096),
            http: Client::new(),
        }
    }

    pub fn build_request(
        &self,
        prompt: &str,
        schema: &JsonSchemaDefinition,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            response_format: Some(ResponseFormat::json_schema(schema.clone())),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl StructuredModel for ChatCompletionsClient {
    async fn generate(
        &self,
        prompt: &str,
        schema: &JsonSchemaDefinition,
    ) -> Result<Option<String>, ApiConnectionError> {
        let request = self.build_request(prompt, schema);
        let response = self.provider.call_chat_completion(&self.http, &request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        if content.is_none() {
            debug!("model response carried no choices or no content");
        }
        Ok(content)
    }
}
