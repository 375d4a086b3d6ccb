// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document text extraction for the offline corpus builder
//!
//! Extraction is an opaque collaborator behind [`TextExtractor`]: the
//! builder only sees a string of raw text. Plain-text sources are read as
//! UTF-8; HTML sources are reduced to their visible text with `scraper`.

use std::path::Path;

use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors from document text extraction
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Source file not found
    #[error("Source document not found: {0}")]
    NotFound(String),

    /// Source file could not be decoded as text
    #[error("Source document is not valid UTF-8 text: {0}")]
    InvalidEncoding(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document-text extraction collaborators
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the raw text of a source document
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Extractor name for logging
    fn name(&self) -> &'static str;
}

/// Reads the source file as UTF-8 plain text
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExtractionError::NotFound(path.display().to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(ExtractionError::InvalidEncoding(path.display().to_string()))
            }
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

/// Reduces an HTML document to its visible text
pub struct HtmlExtractor;

#[async_trait]
impl TextExtractor for HtmlExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let html = PlainTextExtractor.extract_text(path).await?;
        Ok(html_to_text(&html))
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// Pick an extractor by file extension
pub fn extractor_for(path: &Path) -> Box<dyn TextExtractor> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => Box::new(HtmlExtractor),
        _ => Box::new(PlainTextExtractor),
    }
}

fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body").expect("valid selector");
    let skip = Selector::parse("script, style, noscript").expect("valid selector");

    let root = *document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_skipped = node
                .ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .any(|el| skip.matches(&el));
            if in_skipped {
                continue;
            }
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            out.push_str(text.trim());
        }
    }
    out.trim().to_string()
}
