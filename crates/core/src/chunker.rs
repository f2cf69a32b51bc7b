// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding-window text chunker.
//!
//! Splits a context blob into overlapping character windows. Window ends
//! prefer a sentence boundary (`.`, `!`, `?`) when one falls in the second
//! half of the window; otherwise the window ends at the hard size limit.
//! The next window starts `max(prev_start + 1, end - CHUNK_OVERLAP)`, which
//! guarantees forward progress and the declared overlap.
//!
//! The chunker is a total function over strings: it never fails, and an
//! empty input yields an empty list. Windows are measured in characters,
//! not bytes, so multi-byte input never splits inside a code point.

/// Target chunk length in characters.
pub const CHUNK_SIZE: usize = 3_500;

/// Overlap carried into the next chunk: 15% of [`CHUNK_SIZE`].
pub const CHUNK_OVERLAP: usize = 525;

/// Split `text` into ordered, overlapping chunks.
///
/// Inputs of up to [`CHUNK_SIZE`] characters come back as a single chunk,
/// byte-for-byte equal to the input. Longer inputs produce trimmed,
/// non-empty windows of at most [`CHUNK_SIZE`] characters each.
pub fn chunk_text(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= CHUNK_SIZE {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let hard_end = (start + CHUNK_SIZE).min(chars.len());
        let mut end = hard_end;

        // Not the last window: prefer to end on a sentence boundary, but
        // only when the boundary is past half the window.
        if start + CHUNK_SIZE < chars.len() {
            if let Some(boundary) = last_sentence_end(&chars[start..hard_end]) {
                if boundary > CHUNK_SIZE / 2 {
                    end = start + boundary + 1;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end >= chars.len() {
            break;
        }
        start = (start + 1).max(end.saturating_sub(CHUNK_OVERLAP));
    }

    chunks
}

/// Index of the last sentence-ending character in the window, if any.
fn last_sentence_end(window: &[char]) -> Option<usize> {
    window.iter().rposition(|c| matches!(c, '.' | '!' | '?'))
}

#[cfg(test)]
#[path = "chunker_tests.rs"]
mod tests;
