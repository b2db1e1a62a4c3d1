//! Chunker - split text into bounded, overlapping segments.
//!
//! Pure and deterministic: no oracle calls, no I/O, no randomness. Both the
//! recursive compressor and the clusterer's excerpt preparation are built
//! on this module.

use serde::{Deserialize, Serialize};

/// Rough characters-per-token ratio used for budget estimates.
pub(crate) const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of a text.
///
/// Budgets throughout the pipeline are expressed in approximate tokens;
/// chunk geometry is expressed in characters.
pub fn approx_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// A bounded, contiguous slice of a larger text.
///
/// Chunks are ephemeral: created and consumed within a single compression
/// pass. `sequence_index` increases monotonically from zero with no gaps,
/// and chunk order must be preserved by any downstream processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the source text
    pub sequence_index: usize,

    /// The chunk text, including the leading overlap
    pub text: String,
}

impl Chunk {
    /// Chunk length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Estimated chunk length in tokens.
    pub fn approx_tokens(&self) -> usize {
        approx_tokens(&self.text)
    }
}

/// Split `text` into ordered chunks of at most `max_chunk_size` characters.
///
/// Each chunk after the first repeats up to `overlap` characters of the
/// previous chunk's tail, so summarization keeps cross-boundary context.
/// Cut points prefer a word boundary within a small backward tolerance of
/// the ideal cut; otherwise the text is hard-split. Multi-byte characters
/// are never split.
///
/// Text at or under `max_chunk_size` characters yields a single chunk.
/// Stripping each chunk's leading overlap and concatenating reconstructs
/// the input exactly.
///
/// Callers must ensure `max_chunk_size > 0` and `overlap < max_chunk_size`;
/// the pipeline validates both before any run.
pub fn chunk(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(max_chunk_size > 0, "max_chunk_size must be positive");
    debug_assert!(overlap < max_chunk_size, "overlap must be below chunk size");

    // Byte offset of every char, so slicing stays on char boundaries.
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = offsets.len();

    if n <= max_chunk_size {
        return vec![Chunk {
            sequence_index: 0,
            text: text.to_string(),
        }];
    }

    let byte_at = |char_pos: usize| -> usize {
        if char_pos == n {
            text.len()
        } else {
            offsets[char_pos]
        }
    };

    let advance = max_chunk_size - overlap;
    let tolerance = (advance / 5).max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < n {
        let ideal_end = (start + advance).min(n);
        let end = if ideal_end == n {
            n
        } else {
            find_cut_point(text, &offsets, ideal_end, tolerance)
        };

        let lead = start.saturating_sub(overlap);
        chunks.push(Chunk {
            sequence_index: chunks.len(),
            text: text[byte_at(lead)..byte_at(end)].to_string(),
        });

        start = end;
    }

    chunks
}

/// First chunk of a text, used as a bounded excerpt for oracle context.
pub(crate) fn leading_excerpt(text: &str, max_chunk_size: usize, overlap: usize) -> String {
    chunk(text, max_chunk_size, overlap)
        .into_iter()
        .next()
        .map(|c| c.text)
        .unwrap_or_default()
}

/// Find a cut point at or before `ideal_end` that does not break a word.
///
/// Scans backward up to `tolerance` positions for a boundary (whitespace on
/// either side of the cut); hard-splits at `ideal_end` if none is found.
fn find_cut_point(text: &str, offsets: &[usize], ideal_end: usize, tolerance: usize) -> usize {
    let char_at = |pos: usize| -> char {
        // Safe: pos < offsets.len() at every call site below.
        text[offsets[pos]..].chars().next().unwrap_or(' ')
    };

    let lowest = ideal_end.saturating_sub(tolerance);
    let mut cut = ideal_end;
    while cut > lowest {
        if char_at(cut - 1).is_whitespace() || char_at(cut).is_whitespace() {
            return cut;
        }
        cut -= 1;
    }

    ideal_end
}
