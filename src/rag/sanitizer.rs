// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text sanitization applied to every chunk before vectorization
//!
//! Keeps human-readable multilingual text (letters, numbers, punctuation,
//! space separators, tabs, newlines) and strips control and binary noise.
//! Whitespace is normalized so that extraction artifacts do not leak into
//! embeddings. The whole pass is idempotent.

use std::sync::OnceLock;

use regex::Regex;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{M}\p{N}\p{P}\p{Zs}\n\r\t]").expect("valid regex"))
}

fn horizontal_ws() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{Zs}\t]+").expect("valid regex"))
}

fn newline_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Sanitize one chunk of extracted document text.
///
/// Removes characters outside letters/numbers/punctuation/space-separators
/// (any script) plus tab and line breaks, collapses horizontal whitespace
/// runs to a single space, collapses 3+ consecutive newlines to a paragraph
/// break, and trims the ends. Chunks that sanitize to an empty string are
/// discarded by the corpus builder.
pub fn sanitize(text: &str) -> String {
    let stripped = disallowed().replace_all(text, "");
    // CRLF and stray CR normalize to LF so paragraph collapsing sees plain newlines.
    let unified = stripped.replace("\r\n", "\n").replace('\r', "\n");
    let spaced = horizontal_ws().replace_all(&unified, " ");
    let collapsed = newline_runs().replace_all(&spaced, "\n\n");
    collapsed.trim().to_string()
}
