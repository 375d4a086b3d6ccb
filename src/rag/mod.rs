// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) module
// Offline corpus construction and online semantic retrieval

pub mod corpus;
pub mod embedding;
pub mod errors;
pub mod retriever;
pub mod sanitizer;
pub mod segmenter;

pub use corpus::{BuildProgress, Chunk, CorpusBuildConfig, CorpusBuilder, CorpusStore};
pub use embedding::Embedding;
pub use errors::CorpusError;
pub use retriever::SemanticRetriever;
pub use sanitizer::sanitize;
pub use segmenter::segment;
