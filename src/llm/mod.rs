//! Language model client
//!
//! [`CompletionModel`] is the seam the orchestrator talks to; [`LlmService`]
//! implements it over HTTP for OpenAI-compatible, Azure OpenAI and Ollama
//! chat endpoints.

pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
pub use prompts::PromptTemplate;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::GuideRagError;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One completion call: messages plus sampling budget
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl CompletionRequest {
    /// A request carrying a single system prompt
    pub fn from_system_prompt(prompt: impl Into<String>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            messages: vec![ChatMessage::system(prompt)],
            temperature,
            max_tokens,
        }
    }
}

/// Language model collaborator
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Azure,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = GuideRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "azure" | "azure_openai" => Ok(Self::Azure),
            "ollama" => Ok(Self::Ollama),
            other => Err(GuideRagError::ConfigError(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}

pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    api_version: String,
    client: Client,
}

impl LlmService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let llm = &config.llm;
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs.saturating_add(5)))
            .build()
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: llm.provider.parse()?,
            endpoint: llm.endpoint.trim_end_matches('/').to_string(),
            api_key: llm.api_key.clone(),
            model: llm.model.clone(),
            api_version: llm.api_version.clone(),
            client,
        })
    }

    pub const fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn require_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GuideRagError::ConfigError(format!("{:?} API key not provided", self.provider)))
    }

    fn chat_url(&self) -> String {
        match self.provider {
            LlmProvider::OpenAI => format!("{}/chat/completions", self.endpoint),
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint, self.model, self.api_version
            ),
            LlmProvider::Ollama => format!("{}/api/chat", self.endpoint),
        }
    }

    async fn complete_openai(&self, request: &CompletionRequest) -> Result<String> {
        #[derive(Serialize)]
        struct ChatCompletionRequest<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
            messages: &'a [ChatMessage],
            temperature: f32,
            max_tokens: usize,
            top_p: f32,
        }

        #[derive(Deserialize)]
        struct ChatCompletionResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: Option<String>,
        }

        let api_key = self.require_key()?;
        let body = ChatCompletionRequest {
            // Azure routes by deployment in the URL
            model: (self.provider == LlmProvider::OpenAI).then_some(self.model.as_str()),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: 0.95,
        };

        let builder = self.client.post(self.chat_url()).json(&body);
        let builder = match self.provider {
            LlmProvider::Azure => builder.header("api-key", api_key),
            _ => builder.header("Authorization", format!("Bearer {api_key}")),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideRagError::LlmError(format!(
                "{:?} API error ({status}): {error_text}",
                self.provider
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GuideRagError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GuideRagError::LlmError("No choices in response".to_string()))
    }

    async fn complete_ollama(&self, request: &CompletionRequest) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            message: OllamaMessage,
        }

        #[derive(Deserialize)]
        struct OllamaMessage {
            content: String,
        }

        let body = OllamaChatRequest {
            model: &self.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideRagError::LlmError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| GuideRagError::LlmError(format!("Failed to parse response: {e}")))?;

        Ok(result.message.content)
    }
}

#[async_trait]
impl CompletionModel for LlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            "LLM call: provider={:?} model={} temperature={} max_tokens={}",
            self.provider, self.model, request.temperature, request.max_tokens
        );
        let answer = match self.provider {
            LlmProvider::OpenAI | LlmProvider::Azure => self.complete_openai(&request).await?,
            LlmProvider::Ollama => self.complete_ollama(&request).await?,
        };
        Ok(answer.trim().to_string())
    }
}
