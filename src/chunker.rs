//! Overlapping character-window chunker.
//!
//! Splits each document's text into windows of at most `chunk_size`
//! characters, with `chunk_overlap` characters shared between consecutive
//! windows. The length function is raw character count, and every chunk
//! records the character offset of its first character in the parent text
//! (`start_index`), so ordered chunks minus the overlap reconstruct the
//! original text exactly.
//!
//! Window cuts prefer a paragraph break, then a newline, then a space
//! inside the window; a window with no such boundary is cut hard at
//! `chunk_size`. Splitting is deterministic.

use crate::models::{Chunk, Document};

/// Split documents into overlapping chunks.
///
/// An empty document produces zero chunks; a document shorter than
/// `chunk_size` produces exactly one chunk with `start_index` 0.
///
/// Callers must ensure `chunk_overlap < chunk_size` (enforced by config
/// validation).
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for doc in documents {
        split_document(doc, chunk_size, chunk_overlap, &mut chunks);
    }
    chunks
}

fn split_document(doc: &Document, chunk_size: usize, chunk_overlap: usize, out: &mut Vec<Chunk>) {
    let chars: Vec<char> = doc.text.chars().collect();
    let total = chars.len();
    if total == 0 {
        return;
    }

    let mut start = 0usize;
    loop {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end == total {
            hard_end
        } else {
            cut_position(&chars, start, hard_end, chunk_overlap)
        };

        out.push(Chunk {
            source: doc.source.clone(),
            text: chars[start..end].iter().collect(),
            start_index: start,
        });

        if end == total {
            break;
        }
        start = end - chunk_overlap;
    }
}

/// Pick the cut position for a window `[start, hard_end)` that does not
/// reach the end of the text. Scans backward for a paragraph break, then
/// a newline, then a space, keeping the cut far enough past `start` that
/// the next window (which begins `overlap` characters before the cut)
/// still advances.
fn cut_position(chars: &[char], start: usize, hard_end: usize, overlap: usize) -> usize {
    let min_cut = start + overlap + 1;

    let mut newline_cut = None;
    let mut space_cut = None;
    for c in (min_cut..=hard_end).rev() {
        match chars[c - 1] {
            '\n' => {
                if c >= 2 && chars[c - 2] == '\n' {
                    return c;
                }
                newline_cut.get_or_insert(c);
            }
            ' ' => {
                space_cut.get_or_insert(c);
            }
            _ => {}
        }
    }

    newline_cut.or(space_cut).unwrap_or(hard_end)
}
