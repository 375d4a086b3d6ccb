// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for corpus construction and loading
//!
//! Build and load failures are fatal by design: the service must never start
//! against a missing, empty, or inconsistent corpus.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors that can occur while building or loading the corpus vector store
#[derive(Error, Debug)]
pub enum CorpusError {
    /// Chunk size of zero requested for segmentation
    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,

    /// The source document produced no usable chunks after sanitization
    #[error("Source document yielded no non-empty chunks")]
    EmptyCorpus,

    /// Persisted store file not found at the configured path
    #[error("Corpus store not found at path: {0}")]
    StoreNotFound(String),

    /// Persisted store could not be parsed as a chunk array
    #[error("Failed to parse corpus store: {0}")]
    StoreMalformed(String),

    /// A chunk's embedding length disagrees with the rest of the store
    #[error("Dimension mismatch at chunk {index}: expected {expected}D, got {actual}D")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Embedding batch returned a different number of vectors than requested
    #[error("Embedding batch returned {actual} vectors for {expected} inputs")]
    BatchShape { expected: usize, actual: usize },

    /// Embedding collaborator call failed
    #[error("Embedding call failed: {0}")]
    Embedding(#[from] LlmError),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
