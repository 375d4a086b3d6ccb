// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Semantic retrieval over the corpus vector store
//!
//! Ranks every stored chunk by cosine similarity against a single query
//! embedding. The query is enriched with the tail of the conversation so
//! follow-up questions ("what about that?") still land near the right
//! passages. The store is never mutated.

use std::sync::Arc;

use tracing::debug;

use super::corpus::CorpusStore;
use super::embedding::Embedding;
use crate::llm::{EmbeddingIntent, EmbeddingProvider, LlmError};
use crate::session::Turn;

/// How many trailing history turns enrich the retrieval query
const HISTORY_WINDOW: usize = 4;

/// Top-K cosine similarity retriever
pub struct SemanticRetriever {
    store: Arc<CorpusStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SemanticRetriever {
    pub fn new(store: Arc<CorpusStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    /// Return the texts of the `top_k` chunks most similar to the query
    ///
    /// An empty store short-circuits to an empty result without touching the
    /// embedding collaborator. Ties keep store order (stable sort), so
    /// identical inputs always rank identically.
    pub async fn retrieve(
        &self,
        query: &str,
        history: &[Turn],
        top_k: usize,
    ) -> Result<Vec<String>, LlmError> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }

        let combined = Self::combined_query(query, history);
        let query_vector = self
            .embedder
            .embed(&combined, EmbeddingIntent::Query)
            .await?;
        let query_embedding = Embedding::new(query_vector);

        let mut scored: Vec<(usize, f32)> = self
            .store
            .chunks()
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                (index, query_embedding.cosine_similarity(&chunk.embedding))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        if let Some((index, score)) = scored.first() {
            debug!("Top retrieval hit: chunk {} (score {:.4})", index, score);
        }

        Ok(scored
            .into_iter()
            .map(|(index, _)| self.store.chunks()[index].text.clone())
            .collect())
    }

    /// Last `HISTORY_WINDOW` turns (oldest to newest, blank turns skipped)
    /// plus the new query, newline-joined
    fn combined_query(query: &str, history: &[Turn]) -> String {
        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut parts: Vec<&str> = history[window_start..]
            .iter()
            .map(|turn| turn.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect();
        parts.push(query);
        parts.join("\n")
    }
}
