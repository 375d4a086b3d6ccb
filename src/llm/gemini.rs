// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini REST client for embeddings and generation
//!
//! Talks to the Generative Language API over HTTPS with API-key auth.
//! Embedding calls carry a retrieval task type so documents and queries are
//! encoded in a compatible space; batch embedding is capped at the service's
//! 100-item limit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingIntent, EmbeddingProvider, GenerationOptions, GenerationProvider, LlmError};
use crate::session::{Role, Turn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Service-imposed maximum number of texts per batch embedding call
pub const EMBED_BATCH_LIMIT: usize = 100;

const REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Gemini API client implementing both collaborator traits
pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    embed_model: String,
    generate_model: String,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `embed_model` - embedding model id (e.g. "text-embedding-004")
    /// * `generate_model` - generation model id (e.g. "gemini-1.5-flash")
    pub fn new(api_key: String, embed_model: String, generate_model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_model,
            generate_model,
        }
    }

    /// Override the API base URL (local mock servers in tests)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NoApiKey);
        }

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_ms: REQUEST_TIMEOUT_MS,
                    }
                } else {
                    LlmError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(LlmError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if status == 401 || status == 403 {
            return Err(LlmError::NoApiKey);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn content_from_text(text: &str) -> Content {
        Content {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn content_from_turn(turn: &Turn) -> Content {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Content {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, LlmError> {
        let url = format!(
            "{}/models/{}:embedContent",
            self.base_url, self.embed_model
        );
        let request = EmbedRequest {
            model: format!("models/{}", self.embed_model),
            content: Self::content_from_text(text),
            task_type: intent.as_task_type().to_string(),
        };

        let data: EmbedResponse = self.post_json(url, &request).await?;
        Ok(data.embedding.values)
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        intent: EmbeddingIntent,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.len() > EMBED_BATCH_LIMIT {
            return Err(LlmError::BatchTooLarge {
                size: texts.len(),
                limit: EMBED_BATCH_LIMIT,
            });
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, self.embed_model
        );
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.embed_model),
                    content: Self::content_from_text(text),
                    task_type: intent.as_task_type().to_string(),
                })
                .collect(),
        };

        let data: BatchEmbedResponse = self.post_json(url, &request).await?;

        if data.embeddings.len() != texts.len() {
            return Err(LlmError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.embeddings.len()
            )));
        }

        Ok(data.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        message: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.generate_model
        );

        let mut contents: Vec<Content> = history.iter().map(Self::content_from_turn).collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: message.to_string(),
            }],
        });

        let request = GenerateRequest {
            system_instruction: Self::content_from_text(system_instruction),
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: options.max_output_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
            },
        };

        let data: GenerateResponse = self.post_json(url, &request).await?;

        // A response with no candidates or no text parts (e.g. a safety
        // block) surfaces as an empty string; the orchestrator substitutes
        // its clarification reply.
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: String,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbedValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbedValues>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
