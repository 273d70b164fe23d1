use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::prompt::PromptTemplate;
use super::ServiceError;
use crate::config::{ConfigResult, ConfigurationError, TextGenerationConfig};
use crate::resilience::{RetryError, RetryPolicy};

/// One request/response exchange with a text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_message: &str, user_message: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions HTTP client
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiChatClient {
    pub fn new(config: &TextGenerationConfig) -> ConfigResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ConfigurationError::invalid_value("text_generation.endpoint", &config.endpoint, e.to_string())
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("enricher/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ConfigurationError::invalid_value("text_generation", "http client", e.to_string())
            })?;

        info!(
            endpoint = %endpoint,
            model = %config.model,
            timeout_seconds = config.request_timeout_seconds,
            "🌐 SERVICE: Created text-generation client"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn generate(&self, system_message: &str, user_message: &str) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_message,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(content)
    }
}

/// Renders a batch into one request and retries the service call
#[derive(Clone)]
pub struct TranslationClient {
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
    retry: RetryPolicy,
}

impl TranslationClient {
    pub fn new(generator: Arc<dyn TextGenerator>, template: PromptTemplate, retry: RetryPolicy) -> Self {
        Self {
            generator,
            template,
            retry,
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Raw response text for the batch.
    ///
    /// An `Err` means every attempt failed and the batch gets no translations.
    pub async fn translate<S: AsRef<str> + Sync>(
        &self,
        titles: &[S],
    ) -> Result<String, RetryError<ServiceError>> {
        if titles.is_empty() {
            return Ok(String::new());
        }

        let request = self.template.render(titles);
        let system_message = self.template.system_message();

        let result = self
            .retry
            .run("translate_batch", |_| self.generator.generate(system_message, &request))
            .await;

        match &result {
            Ok(response) => debug!(
                titles = titles.len(),
                response_lines = response.lines().count(),
                "🌐 SERVICE: Batch translated"
            ),
            Err(e) => error!(
                titles = titles.len(),
                attempts = e.attempts,
                error = %e.last_error,
                "🌐 SERVICE: Giving up on batch"
            ),
        }
        result
    }
}
