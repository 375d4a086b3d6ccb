// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversation orchestrator
//!
//! Composes session memory and semantic retrieval into one grounded
//! generation call, then persists the new turn pair. Session state is only
//! written after a successful generation, so a collaborator failure leaves
//! the session exactly as it was.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::prompts::{
    grounded_user_message, CLARIFICATION_REPLY, CONTEXT_SEPARATOR, SYSTEM_INSTRUCTION,
};
use crate::llm::{GenerationOptions, GenerationProvider, LlmError};
use crate::rag::SemanticRetriever;
use crate::session::{SessionStore, Turn};

/// Chunks retrieved per turn to ground the reply
const RETRIEVAL_TOP_K: usize = 3;

/// Errors surfaced by a chat turn
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or blank sessionId/prompt
    #[error("sessionId and prompt are required")]
    MissingInput,

    /// Embedding or generation collaborator failed
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

/// Orchestrates one conversational turn end to end
pub struct ChatEngine {
    retriever: SemanticRetriever,
    sessions: Arc<SessionStore>,
    generator: Arc<dyn GenerationProvider>,
    options: GenerationOptions,
}

impl ChatEngine {
    pub fn new(
        retriever: SemanticRetriever,
        sessions: Arc<SessionStore>,
        generator: Arc<dyn GenerationProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            retriever,
            sessions,
            generator,
            options,
        }
    }

    /// Handle one user turn and return the model's reply
    ///
    /// # Errors
    ///
    /// `MissingInput` when either argument is blank after trimming;
    /// `Upstream` when a collaborator call fails. In the upstream case no
    /// turn is recorded.
    pub async fn handle_turn(&self, session_id: &str, prompt: &str) -> Result<String, ChatError> {
        let session_id = session_id.trim();
        let prompt = prompt.trim();
        if session_id.is_empty() || prompt.is_empty() {
            return Err(ChatError::MissingInput);
        }

        let history = self.sessions.get(session_id).await;
        let passages = self
            .retriever
            .retrieve(prompt, &history, RETRIEVAL_TOP_K)
            .await?;
        debug!(
            "Session {}: {} passages retrieved for prompt",
            session_id,
            passages.len()
        );
        let context_block = passages.join(CONTEXT_SEPARATOR);

        let message = grounded_user_message(&context_block, prompt);
        let raw = self
            .generator
            .generate(SYSTEM_INSTRUCTION, &history, &message, &self.options)
            .await?;

        // An empty generation is recoverable: substitute the clarification
        // request rather than returning a blank reply.
        let reply = if raw.trim().is_empty() {
            CLARIFICATION_REPLY.to_string()
        } else {
            raw
        };

        let mut turns = history;
        turns.push(Turn::user(prompt));
        turns.push(Turn::model(reply.clone()));
        self.sessions.set(session_id, turns).await;

        Ok(reply)
    }
}
