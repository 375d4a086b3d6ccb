// Tests for the offline build path: sanitization-driven chunk dropping,
// EmptyCorpus before any embedding call, sequential batching with order
// preservation, and abort on embedding failure

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use fabstir_rag_gateway::llm::{EmbeddingIntent, EmbeddingProvider, LlmError};
use fabstir_rag_gateway::rag::{CorpusBuildConfig, CorpusBuilder, CorpusError};

/// Deterministic embedding derived from the text content, so order mixups
/// between texts and vectors are detectable.
fn hash_embedding(text: &str) -> Vec<f32> {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = hasher.finalize();

    hash.iter()
        .take(8)
        .map(|byte| (*byte as f32 / 255.0) * 2.0 - 1.0)
        .collect()
}

/// Embedder that hashes each text and records every batch it receives
struct RecordingEmbedder {
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    intents: Mutex<Vec<EmbeddingIntent>>,
}

impl RecordingEmbedder {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            intents: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.intents.lock().unwrap().push(intent);
        Ok(hash_embedding(text))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        intent: EmbeddingIntent,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.to_vec());
        self.intents.lock().unwrap().push(intent);
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }
}

/// Embedder that always fails
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str, _intent: EmbeddingIntent) -> Result<Vec<f32>, LlmError> {
        Err(LlmError::ApiError {
            status: 503,
            message: "embedding service down".to_string(),
        })
    }

    async fn embed_batch(
        &self,
        _texts: &[String],
        _intent: EmbeddingIntent,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::ApiError {
            status: 503,
            message: "embedding service down".to_string(),
        })
    }
}

#[tokio::test]
async fn test_build_pairs_each_chunk_with_its_own_vector() {
    let embedder = Arc::new(RecordingEmbedder::new());
    let builder = CorpusBuilder::new(
        embedder.clone(),
        CorpusBuildConfig {
            chunk_chars: 10,
            batch_size: 2,
        },
    );

    let raw = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJ";
    let store = builder.build(raw, None).await.unwrap();

    assert_eq!(store.len(), 5);
    for chunk in store.chunks() {
        assert_eq!(chunk.embedding, hash_embedding(&chunk.text));
    }

    // 5 chunks at batch size 2 means 3 sequential batch calls.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    let batches = embedder.batches.lock().unwrap();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[2].len(), 1);

    // Batch order matches chunk order.
    let flattened: Vec<String> = batches.iter().flatten().cloned().collect();
    let stored: Vec<String> = store.chunks().iter().map(|c| c.text.clone()).collect();
    assert_eq!(flattened, stored);
}

#[tokio::test]
async fn test_build_uses_document_intent() {
    let embedder = Arc::new(RecordingEmbedder::new());
    let builder = CorpusBuilder::new(embedder.clone(), CorpusBuildConfig::default());

    builder.build("some source text", None).await.unwrap();

    let intents = embedder.intents.lock().unwrap();
    assert!(intents.iter().all(|i| *i == EmbeddingIntent::Document));
}

#[tokio::test]
async fn test_build_drops_chunks_that_sanitize_to_empty() {
    let embedder = Arc::new(RecordingEmbedder::new());
    let builder = CorpusBuilder::new(
        embedder.clone(),
        CorpusBuildConfig {
            chunk_chars: 4,
            batch_size: 99,
        },
    );

    // Second 4-char chunk is pure control noise and must be dropped.
    let raw = "keep\u{0000}\u{0001}\u{0002}\u{0003}me!!";
    let store = builder.build(raw, None).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.chunks()[0].text, "keep");
    assert_eq!(store.chunks()[1].text, "me!!");
}

#[tokio::test]
async fn test_all_noise_document_fails_before_embedding() {
    let embedder = Arc::new(RecordingEmbedder::new());
    let builder = CorpusBuilder::new(embedder.clone(), CorpusBuildConfig::default());

    let raw = "\u{0000}\u{0001}\u{0002}\u{0007}\u{001b}\u{0008}";
    let result = builder.build(raw, None).await;

    assert!(matches!(result, Err(CorpusError::EmptyCorpus)));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_document_fails_before_embedding() {
    let embedder = Arc::new(RecordingEmbedder::new());
    let builder = CorpusBuilder::new(embedder.clone(), CorpusBuildConfig::default());

    let result = builder.build("", None).await;

    assert!(matches!(result, Err(CorpusError::EmptyCorpus)));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embedding_failure_aborts_build() {
    let builder = CorpusBuilder::new(Arc::new(FailingEmbedder), CorpusBuildConfig::default());

    let result = builder.build("perfectly good text", None).await;
    assert!(matches!(result, Err(CorpusError::Embedding(_))));
}
