// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Offline corpus builder
//!
//! Extracts text from a source document, chunks and sanitizes it, embeds
//! every chunk with Document intent, and writes the store the gateway loads
//! at startup. Any failure exits non-zero: there is no partial corpus.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use fabstir_rag_gateway::{
    config::GatewayConfig,
    extraction::extractor_for,
    llm::GeminiClient,
    rag::{BuildProgress, CorpusBuildConfig, CorpusBuilder},
};

#[derive(Parser, Debug)]
#[command(
    name = "build_corpus",
    about = "Build the corpus vector store from a source document"
)]
struct Args {
    /// Source document (plain text or HTML)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the corpus store (defaults to CORPUS_STORE_PATH)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum chunk length in characters
    #[arg(long, env = "CHUNK_CHARS")]
    chunk_chars: Option<usize>,

    /// Texts per embedding batch
    #[arg(long, env = "EMBED_BATCH_SIZE")]
    batch_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = GatewayConfig::from_env()?;

    let output = args.output.unwrap_or_else(|| config.store_path.clone());
    let build_config = CorpusBuildConfig {
        chunk_chars: args.chunk_chars.unwrap_or(config.chunk_chars),
        batch_size: args.batch_size.unwrap_or(config.embed_batch_size),
    };

    let extractor = extractor_for(&args.input);
    println!(
        "📄 Extracting text from {} ({})...",
        args.input.display(),
        extractor.name()
    );
    let raw_text = extractor
        .extract_text(&args.input)
        .await
        .with_context(|| format!("Failed to extract {}", args.input.display()))?;
    println!("   {} characters extracted", raw_text.chars().count());

    let embedder = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.embed_model.clone(),
        config.generate_model.clone(),
    ));
    let builder = Arc::new(CorpusBuilder::new(embedder, build_config));

    let (progress_tx, mut progress_rx) = mpsc::channel(16);
    let build_task = {
        let builder = Arc::clone(&builder);
        tokio::spawn(async move { builder.build(&raw_text, Some(progress_tx)).await })
    };

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}")
            .expect("valid progress template"),
    );
    while let Some(progress) = progress_rx.recv().await {
        match progress {
            BuildProgress::Segmented { kept, dropped } => {
                println!("✂️  {} chunks kept, {} dropped after sanitization", kept, dropped);
                bar.set_message("Embedding batches");
            }
            BuildProgress::BatchEmbedded { batch, total_batches } => {
                bar.set_length(total_batches as u64);
                bar.set_position(batch as u64);
            }
            BuildProgress::Complete { .. } => {
                bar.finish_and_clear();
            }
        }
    }

    let store = build_task
        .await
        .context("Corpus build task panicked")?
        .context("Corpus build failed")?;

    store
        .save(&output)
        .await
        .with_context(|| format!("Failed to write store to {}", output.display()))?;

    println!(
        "✅ Corpus store written: {} chunks, {}D embeddings -> {}",
        store.len(),
        store.dimension(),
        output.display()
    );

    Ok(())
}
