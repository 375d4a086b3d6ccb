// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod chat;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod rag;
pub mod session;

// Re-export main types
pub use api::{build_router, start_server, ApiError, AppState};
pub use chat::{ChatEngine, ChatError};
pub use config::GatewayConfig;
pub use extraction::{extractor_for, ExtractionError, TextExtractor};
pub use llm::{
    EmbeddingIntent, EmbeddingProvider, GeminiClient, GenerationOptions, GenerationProvider,
    LlmError,
};
pub use rag::{
    sanitize, segment, BuildProgress, Chunk, CorpusBuildConfig, CorpusBuilder, CorpusError,
    CorpusStore, SemanticRetriever,
};
pub use session::{Role, SessionConfig, SessionStore, Turn};
