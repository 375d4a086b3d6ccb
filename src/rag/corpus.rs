// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Corpus vector store: offline build, persistence, startup load
//!
//! The store is an ordered collection of (chunk text, embedding) pairs built
//! once from a source document and immutable for the life of the process.
//! There is no partial or degraded corpus: any failure while building or
//! loading is fatal to the operation.
//!
//! ## Build flow
//!
//! 1. Segment the raw text at a fixed chunk size
//! 2. Sanitize each chunk and drop the ones that come back empty
//! 3. Abort with `EmptyCorpus` if nothing survives (before any embedding call)
//! 4. Embed the survivors in strictly sequential batches, Document intent
//! 5. Pair texts with vectors, preserving original order

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;
use tracing::debug;

use super::errors::CorpusError;
use super::sanitizer::sanitize;
use super::segmenter::segment;
use crate::llm::{EmbeddingIntent, EmbeddingProvider};

/// A bounded-length segment of source text paired with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Progress updates emitted while building a corpus
#[derive(Debug, Clone)]
pub enum BuildProgress {
    /// Segmentation and sanitization finished
    Segmented { kept: usize, dropped: usize },

    /// One embedding batch completed
    BatchEmbedded { batch: usize, total_batches: usize },

    /// Build complete
    Complete { chunk_count: usize },
}

/// Read-only, ordered collection of chunks
pub struct CorpusStore {
    chunks: Vec<Chunk>,
}

impl CorpusStore {
    /// Wrap a chunk list, validating embedding dimensionality is uniform
    ///
    /// An empty list is accepted here; the load and build paths layer their
    /// own non-empty requirement on top.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Result<Self, CorpusError> {
        if let Some(first) = chunks.first() {
            let expected = first.embedding.len();
            for (index, chunk) in chunks.iter().enumerate() {
                if chunk.embedding.len() != expected {
                    return Err(CorpusError::DimensionMismatch {
                        index,
                        expected,
                        actual: chunk.embedding.len(),
                    });
                }
            }
        }

        Ok(Self { chunks })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality, 0 for an empty store
    pub fn dimension(&self) -> usize {
        self.chunks.first().map(|c| c.embedding.len()).unwrap_or(0)
    }

    /// Load a previously built store from disk
    ///
    /// # Errors
    ///
    /// Fails on a missing file, malformed JSON, an empty chunk array, or
    /// inconsistent embedding dimensions. All of these are fatal at startup:
    /// the caller must not serve requests against a bad store.
    pub async fn load(path: &Path) -> Result<Self, CorpusError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CorpusError::StoreNotFound(path.display().to_string()));
            }
            Err(e) => return Err(CorpusError::Io(e)),
        };

        let chunks: Vec<Chunk> = serde_json::from_slice(&bytes)
            .map_err(|e| CorpusError::StoreMalformed(e.to_string()))?;

        if chunks.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        let store = Self::from_chunks(chunks)?;
        debug!(
            "Loaded corpus store: {} chunks, {}D embeddings",
            store.len(),
            store.dimension()
        );
        Ok(store)
    }

    /// Persist the store as a JSON array of {text, embedding} records
    pub async fn save(&self, path: &Path) -> Result<(), CorpusError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec(&self.chunks)
            .map_err(|e| CorpusError::StoreMalformed(e.to_string()))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Corpus build configuration
#[derive(Debug, Clone)]
pub struct CorpusBuildConfig {
    /// Maximum chunk length in characters
    pub chunk_chars: usize,
    /// Texts per embedding batch, strictly below the collaborator's limit
    pub batch_size: usize,
}

impl Default for CorpusBuildConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 1500,
            batch_size: 99,
        }
    }
}

/// Offline corpus builder
///
/// Embedding batches are issued sequentially, never in parallel, to respect
/// the collaborator's rate and size limits; order is preserved end to end.
pub struct CorpusBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    config: CorpusBuildConfig,
}

impl CorpusBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: CorpusBuildConfig) -> Self {
        Self { embedder, config }
    }

    /// Build a store from raw extracted document text
    ///
    /// # Arguments
    /// * `raw_text` - extracted source document text
    /// * `progress_tx` - optional channel for progress updates
    ///
    /// # Errors
    ///
    /// `EmptyCorpus` when no chunk survives sanitization (raised before any
    /// embedding call), `BatchShape` when the collaborator returns the wrong
    /// number of vectors, and any embedding failure. Every error aborts the
    /// whole build.
    pub async fn build(
        &self,
        raw_text: &str,
        progress_tx: Option<Sender<BuildProgress>>,
    ) -> Result<CorpusStore, CorpusError> {
        let segments = segment(raw_text, self.config.chunk_chars)?;
        let segment_count = segments.len();

        let texts: Vec<String> = segments
            .into_iter()
            .map(|chunk| sanitize(&chunk))
            .filter(|chunk| !chunk.is_empty())
            .collect();

        if texts.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        if let Some(ref tx) = progress_tx {
            let _ = tx
                .send(BuildProgress::Segmented {
                    kept: texts.len(),
                    dropped: segment_count - texts.len(),
                })
                .await;
        }

        let batch_size = self.config.batch_size.max(1);
        let total_batches = texts.len().div_ceil(batch_size);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
            let batch_vectors = self
                .embedder
                .embed_batch(batch, EmbeddingIntent::Document)
                .await?;

            if batch_vectors.len() != batch.len() {
                return Err(CorpusError::BatchShape {
                    expected: batch.len(),
                    actual: batch_vectors.len(),
                });
            }

            vectors.extend(batch_vectors);

            debug!(
                "Embedded batch {}/{} ({} chunks)",
                batch_index + 1,
                total_batches,
                vectors.len()
            );
            if let Some(ref tx) = progress_tx {
                let _ = tx
                    .send(BuildProgress::BatchEmbedded {
                        batch: batch_index + 1,
                        total_batches,
                    })
                    .await;
            }
        }

        let chunks: Vec<Chunk> = texts
            .into_iter()
            .zip(vectors)
            .map(|(text, embedding)| Chunk { text, embedding })
            .collect();

        let store = CorpusStore::from_chunks(chunks)?;

        if let Some(ref tx) = progress_tx {
            let _ = tx
                .send(BuildProgress::Complete {
                    chunk_count: store.len(),
                })
                .await;
        }

        Ok(store)
    }
}
