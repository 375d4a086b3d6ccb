// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration loaded from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm::GenerationOptions;
use crate::rag::CorpusBuildConfig;
use crate::session::SessionConfig;

/// Configuration for the gateway and the offline builder
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP port for the chat API
    pub api_port: u16,
    /// Path of the persisted corpus store
    pub store_path: PathBuf,
    /// Generative Language API key
    pub api_key: String,
    /// Embedding model id
    pub embed_model: String,
    /// Generation model id
    pub generate_model: String,
    /// Maximum chunk length in characters
    pub chunk_chars: usize,
    /// Texts per embedding batch
    pub embed_batch_size: usize,
    /// Session idle TTL in seconds
    pub session_ttl_secs: u64,
    /// Session sweep interval in seconds
    pub session_sweep_secs: u64,
    /// Generation sampling options
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    ///
    /// Every knob has a default except the API key, which is required.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY must be set")?;

        Ok(Self {
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            store_path: env::var("CORPUS_STORE_PATH")
                .unwrap_or_else(|_| "./data/corpus.json".to_string())
                .into(),
            api_key,
            embed_model: env::var("EMBED_MODEL")
                .unwrap_or_else(|_| "text-embedding-004".to_string()),
            generate_model: env::var("GENERATE_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            chunk_chars: env::var("CHUNK_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
            embed_batch_size: env::var("EMBED_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(99),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            session_sweep_secs: env::var("SESSION_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            max_output_tokens: env::var("GEN_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            temperature: env::var("GEN_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
            top_p: env::var("GEN_TOP_P")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.95),
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.session_ttl_secs),
            sweep_interval: Duration::from_secs(self.session_sweep_secs),
        }
    }

    pub fn build_config(&self) -> CorpusBuildConfig {
        CorpusBuildConfig {
            chunk_chars: self.chunk_chars,
            batch_size: self.embed_batch_size,
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}
