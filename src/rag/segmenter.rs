// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-size text segmentation
//!
//! Splits a source document into contiguous, non-overlapping chunks of at
//! most `max_chunk_chars` characters. Concatenating the chunks in order
//! reproduces the input exactly. Boundaries are purely positional — a chunk
//! may end mid-sentence or mid-word.

use super::errors::CorpusError;

/// Split `text` into ordered chunks of at most `max_chunk_chars` characters.
///
/// Lengths are counted in characters, not bytes, so multilingual input never
/// splits inside a code point.
///
/// # Errors
///
/// Returns `CorpusError::InvalidChunkSize` if `max_chunk_chars` is zero.
pub fn segment(text: &str, max_chunk_chars: usize) -> Result<Vec<String>, CorpusError> {
    if max_chunk_chars == 0 {
        return Err(CorpusError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_chunk_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}
