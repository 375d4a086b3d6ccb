// Tests for SemanticRetriever - empty-store short circuit, top-K bounds,
// deterministic ranking, and history-enriched queries

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use fabstir_rag_gateway::llm::{EmbeddingIntent, EmbeddingProvider, LlmError};
use fabstir_rag_gateway::rag::{Chunk, CorpusStore, SemanticRetriever};
use fabstir_rag_gateway::session::Turn;

/// Embedder returning a fixed vector, recording call count, queries, and intents
struct FixedEmbedder {
    vector: Vec<f32>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    intents: Mutex<Vec<EmbeddingIntent>>,
}

impl FixedEmbedder {
    fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            intents: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(text.to_string());
        self.intents.lock().unwrap().push(intent);
        Ok(self.vector.clone())
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        _intent: EmbeddingIntent,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }
}

fn two_chunk_store() -> CorpusStore {
    CorpusStore::from_chunks(vec![
        Chunk {
            text: "duty without attachment".to_string(),
            embedding: vec![1.0, 0.0],
        },
        Chunk {
            text: "the nature of the self".to_string(),
            embedding: vec![0.0, 1.0],
        },
    ])
    .unwrap()
}

#[tokio::test]
async fn test_empty_store_returns_empty_without_embedding_call() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let store = CorpusStore::from_chunks(vec![]).unwrap();
    let retriever = SemanticRetriever::new(Arc::new(store), embedder.clone());

    let results = retriever.retrieve("anything", &[], 3).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_query_closest_to_first_chunk_wins() {
    // Query embedding sits next to the "duty" vector.
    let embedder = Arc::new(FixedEmbedder::new(vec![0.9, 0.1]));
    let retriever = SemanticRetriever::new(Arc::new(two_chunk_store()), embedder);

    let results = retriever
        .retrieve("how should I act?", &[], 1)
        .await
        .unwrap();

    assert_eq!(results, vec!["duty without attachment".to_string()]);
}

#[tokio::test]
async fn test_results_ordered_by_descending_similarity() {
    let embedder = Arc::new(FixedEmbedder::new(vec![0.2, 0.8]));
    let retriever = SemanticRetriever::new(Arc::new(two_chunk_store()), embedder);

    let results = retriever.retrieve("who am I?", &[], 2).await.unwrap();

    assert_eq!(results[0], "the nature of the self");
    assert_eq!(results[1], "duty without attachment");
}

#[tokio::test]
async fn test_top_k_bounds_result_count() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let retriever = SemanticRetriever::new(Arc::new(two_chunk_store()), embedder);

    let one = retriever.retrieve("q", &[], 1).await.unwrap();
    assert_eq!(one.len(), 1);

    // Asking for more than the store holds returns everything, no error.
    let many = retriever.retrieve("q", &[], 100).await.unwrap();
    assert_eq!(many.len(), 2);
}

#[tokio::test]
async fn test_ties_keep_store_order() {
    // Identical embeddings everywhere: every chunk scores the same, so the
    // stable sort must preserve store order.
    let chunks: Vec<Chunk> = (0..6)
        .map(|i| Chunk {
            text: format!("chunk {}", i),
            embedding: vec![0.5, 0.5],
        })
        .collect();
    let store = CorpusStore::from_chunks(chunks).unwrap();
    let embedder = Arc::new(FixedEmbedder::new(vec![0.5, 0.5]));
    let retriever = SemanticRetriever::new(Arc::new(store), embedder);

    let results = retriever.retrieve("q", &[], 4).await.unwrap();
    assert_eq!(results, vec!["chunk 0", "chunk 1", "chunk 2", "chunk 3"]);
}

#[tokio::test]
async fn test_query_uses_query_intent() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let retriever = SemanticRetriever::new(Arc::new(two_chunk_store()), embedder.clone());

    retriever.retrieve("q", &[], 1).await.unwrap();

    let intents = embedder.intents.lock().unwrap();
    assert_eq!(intents.as_slice(), &[EmbeddingIntent::Query]);
}

#[tokio::test]
async fn test_history_enriches_the_embedded_query() {
    let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
    let retriever = SemanticRetriever::new(Arc::new(two_chunk_store()), embedder.clone());

    let history = vec![
        Turn::user("too old to matter"),
        Turn::user("first kept"),
        Turn::model("second kept"),
        Turn::user(""),
        Turn::model("third kept"),
    ];
    retriever
        .retrieve("the new question", &history, 1)
        .await
        .unwrap();

    let queries = embedder.queries.lock().unwrap();
    assert_eq!(
        queries[0],
        "first kept\nsecond kept\nthird kept\nthe new question"
    );
}
