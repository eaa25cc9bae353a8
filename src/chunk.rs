//! Whitespace normalization and sliding-window text chunking.
//!
//! Splits normalized document text into overlapping [`DocumentChunk`]s whose
//! spans are character offsets into the normalized text. Window ends snap
//! backward to the nearest sentence terminator so chunks tend to close on a
//! sentence rather than mid-word.
//!
//! # Algorithm
//!
//! 1. Normalize: runs of spaces/tabs collapse to one space, 3+ consecutive
//!    newlines collapse to two, leading/trailing whitespace is trimmed.
//! 2. Text that fits in one window becomes exactly one chunk.
//! 3. Otherwise slide a `chunk_size` window: clamp the tentative end, snap
//!    it back (up to [`SENTENCE_SEARCH_WINDOW`] chars) to just after `.`,
//!    `!`, `?`, or a blank line, emit the slice if its trimmed content is
//!    non-empty, then advance `start` to `max(end - overlap, start + 1)`.
//!
//! The `start + 1` floor guarantees termination even when
//! `overlap >= chunk_size`.

use uuid::Uuid;

use crate::models::DocumentChunk;

/// How far backward from a tentative window end to look for a terminator.
pub const SENTENCE_SEARCH_WINDOW: usize = 200;

/// How far past `chunk_size` a snapped end may land.
pub const SENTENCE_SNAP_SLACK: usize = 100;

/// Collapse whitespace the way the chunker expects its input.
///
/// Runs of non-newline whitespace become a single space, runs of three or
/// more newlines become exactly two (newlines separated only by spaces/tabs
/// count as consecutive), and the result is trimmed. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newline_run = 0usize;

    for ch in text.chars() {
        if ch == '\n' {
            newline_run += 1;
            pending_space = false;
            continue;
        }
        if ch.is_whitespace() {
            if newline_run == 0 {
                pending_space = true;
            }
            continue;
        }
        if !out.is_empty() {
            if newline_run >= 2 {
                out.push_str("\n\n");
            } else if newline_run == 1 {
                out.push('\n');
            } else if pending_space {
                out.push(' ');
            }
        }
        newline_run = 0;
        pending_space = false;
        out.push(ch);
    }

    out
}

/// Split `text` into overlapping chunks attributed to `source`.
///
/// The input is normalized first; all spans index into that normalized form
/// in character units. Returns an empty vector for empty (or all-whitespace)
/// input. Chunk indices are assigned in emission order starting at 0.
pub fn chunk_text(
    text: &str,
    source: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<DocumentChunk> {
    let normalized = normalize(text);
    let chars: Vec<char> = normalized.chars().collect();
    let total = chars.len();
    if total == 0 {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();

    if total <= chunk_size {
        push_chunk(&mut chunks, &chars, source, 0, total);
        return chunks;
    }

    let mut start = 0usize;
    while start < total {
        let mut end = (start + chunk_size).min(total);
        if end < total {
            if let Some(snapped) = snap_to_terminator(&chars, start, end) {
                if snapped <= start + chunk_size + SENTENCE_SNAP_SLACK {
                    end = snapped;
                }
            }
        }

        push_chunk(&mut chunks, &chars, source, start, end);

        if end >= total {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Find the end position just after the sentence terminator nearest to
/// `end`, scanning backward at most [`SENTENCE_SEARCH_WINDOW`] characters.
/// Returns `None` when no terminator lies strictly inside `(start, end)`.
fn snap_to_terminator(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let floor = start.max(end.saturating_sub(SENTENCE_SEARCH_WINDOW));
    let mut i = end;
    while i > floor {
        i -= 1;
        let candidate = match chars[i] {
            '.' | '!' | '?' => Some(i + 1),
            '\n' if i > 0 && chars[i - 1] == '\n' => Some(i + 1),
            _ => None,
        };
        if let Some(pos) = candidate {
            if pos > start {
                return Some(pos);
            }
        }
    }
    None
}

/// Emit `[start, end)` as a chunk unless its trimmed content is empty.
fn push_chunk(
    chunks: &mut Vec<DocumentChunk>,
    chars: &[char],
    source: &str,
    start: usize,
    end: usize,
) {
    let slice: String = chars[start..end].iter().collect();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let index = chunks.len();
    chunks.push(DocumentChunk {
        id: format!("{}-{}-{}", source, index, Uuid::new_v4()),
        text: trimmed.to_string(),
        chunk_index: index,
        filename: source.to_string(),
        start_position: start,
        end_position: end,
    });
}
