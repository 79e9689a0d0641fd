//! Embedding API clients for the supported providers

use futures::stream::StreamExt;
use futures::stream::{
    self,
};
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::GuideRagError;
use crate::errors::Result;

/// Concurrent in-flight requests against Ollama, which has no batch endpoint
const OLLAMA_CONCURRENCY: usize = 8;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible `/embeddings` API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = GuideRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(GuideRagError::ConfigError(format!(
                "Unknown embedding provider: {other}"
            ))),
        }
    }
}

/// Client for generating embeddings from a remote model
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: EmbeddingProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub const fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing embedding)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbeddingProvider::OpenAI => self
                .generate_batch_openai(vec![text])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| GuideRagError::EmbeddingError("No embedding in response".to_string())),
            EmbeddingProvider::Ollama => self.generate_ollama(text).await,
        }
    }

    /// Generate embeddings for multiple texts, preserving input order
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Response count not matching the request
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let expected = texts.len();
        let embeddings = match self.provider {
            EmbeddingProvider::OpenAI => self.generate_batch_openai(texts).await?,
            EmbeddingProvider::Ollama => {
                let concurrency = std::cmp::max(1, std::cmp::min(texts.len(), OLLAMA_CONCURRENCY));
                let owned: Vec<String> = texts.into_iter().map(str::to_string).collect();
                let results: Vec<Result<Vec<f32>>> = stream::iter(owned)
                    .map(|text| async move { self.generate_ollama(&text).await })
                    .buffered(concurrency)
                    .collect()
                    .await;

                results.into_iter().collect::<Result<Vec<_>>>()?
            }
        };

        if embeddings.len() != expected {
            return Err(GuideRagError::EmbeddingError(format!(
                "Expected {expected} embeddings, got {}",
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }

    /// Generate embeddings in batch using `OpenAI` API
    async fn generate_batch_openai(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GuideRagError::ConfigError("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIBatchRequest<'a> {
            input: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            index: usize,
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI batch embeddings API: {} items", texts.len());

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideRagError::EmbeddingError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let mut result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GuideRagError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        result.data.sort_by_key(|d| d.index);
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GuideRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideRagError::EmbeddingError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GuideRagError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "OpenAI".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::OpenAI
        );
        assert_eq!(
            "ollama".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::Ollama
        );
        assert!("cohere".parse::<EmbeddingProvider>().is_err());
    }

    #[tokio::test]
    async fn test_openai_requires_api_key() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        )
        .unwrap();

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GuideRagError::ConfigError(_)));
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_ollama_batch_is_send_and_reports_failures() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            "all-minilm".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        )
        .unwrap();

        let batch = client.generate_batch(vec!["Block API", "Search API"]);
        assert_send(&batch);
        let err = batch.await.unwrap_err();
        assert!(err.is_collaborator_failure());
    }

    #[tokio::test]
    #[ignore = "Requires a running Ollama instance"]
    async fn test_ollama_embedding() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            "all-minilm".to_string(),
            "http://localhost:11434".to_string(),
            None,
        )
        .unwrap();

        let embedding = client.generate("Block API").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
