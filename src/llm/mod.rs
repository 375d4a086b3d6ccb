// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding and generation collaborator interfaces
//!
//! The gateway treats embedding computation and text generation as opaque
//! remote services. Both are reached through the traits in this module so
//! the retrieval core and orchestrator can be exercised against in-process
//! fakes in tests. The production implementation is [`GeminiClient`].

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::Turn;

/// How a text is embedded. Queries and documents are encoded asymmetrically
/// by the embedding service; mixing intents degrades ranking quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingIntent {
    /// Corpus chunk embedded at build time
    Document,
    /// Live retrieval query
    Query,
}

impl EmbeddingIntent {
    /// Task type string understood by the embedding service
    pub fn as_task_type(&self) -> &'static str {
        match self {
            EmbeddingIntent::Document => "RETRIEVAL_DOCUMENT",
            EmbeddingIntent::Query => "RETRIEVAL_QUERY",
        }
    }
}

/// Sampling options forwarded to the generation service
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: 1024,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

/// Errors from the embedding/generation collaborators
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error from the remote service
    #[error("LLM API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Request timed out
    #[error("LLM request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// No API key configured
    #[error("No API key configured for the LLM service")]
    NoApiKey,

    /// Batch larger than the service's per-call item limit
    #[error("Batch of {size} texts exceeds the embedding limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// Response did not have the expected shape
    #[error("Malformed LLM response: {0}")]
    InvalidResponse(String),
}

/// Trait for embedding-vector collaborators
///
/// Implementations map text to a fixed-length vector; all vectors from one
/// implementation share the same dimensionality.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text with the given intent
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, LlmError>;

    /// Embed a batch of texts with the given intent
    ///
    /// The result preserves input order: the i-th vector corresponds to the
    /// i-th text. Implementations reject batches above their per-call limit.
    async fn embed_batch(
        &self,
        texts: &[String],
        intent: EmbeddingIntent,
    ) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Trait for text-generation collaborators
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a reply to `message` given a system instruction and the
    /// session's prior turns. An empty string is a valid (if unhelpful)
    /// output; the caller decides how to handle it.
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        message: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;
}
