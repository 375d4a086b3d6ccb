// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use fabstir_rag_gateway::{
    api::{start_server, AppState},
    chat::ChatEngine,
    config::GatewayConfig,
    llm::GeminiClient,
    rag::{CorpusStore, SemanticRetriever},
    session::SessionStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir RAG Gateway...\n");

    let config = GatewayConfig::from_env()?;

    // The corpus store must load before the listener binds: an unready
    // retrieval index must never serve requests. Any load failure is fatal.
    println!("📚 Loading corpus store from {}...", config.store_path.display());
    let store = CorpusStore::load(&config.store_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load corpus store from {} (run build_corpus first)",
                config.store_path.display()
            )
        })?;
    println!(
        "✅ Corpus loaded: {} chunks, {}D embeddings",
        store.len(),
        store.dimension()
    );
    let store = Arc::new(store);

    let gemini = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.embed_model.clone(),
        config.generate_model.clone(),
    ));

    let sessions = Arc::new(SessionStore::new(config.session_config()));
    sessions.spawn_sweeper();

    let retriever = SemanticRetriever::new(Arc::clone(&store), gemini.clone());
    let engine = Arc::new(ChatEngine::new(
        retriever,
        Arc::clone(&sessions),
        gemini,
        config.generation_options(),
    ));

    let state = AppState {
        engine,
        store,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    start_server(addr, state).await
}
