use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Why a chunk ends where it does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkBoundary {
    /// Closed at a sentence terminator
    Sentence,
    /// Oversized sentence split between two words
    Whitespace,
    /// Word longer than the budget, split at a character offset
    Forced,
    /// Whole sentence kept even though it exceeds the budget
    Oversized,
}

/// A bounded-size slice of the source document, the unit of synthesis.
///
/// `char_range` is the byte range of the document owned by this chunk. The ranges
/// of consecutive chunks tile the document, so slicing the document with every
/// `char_range` in order gives it back byte for byte. `text` is the trimmed
/// content found at `text_range`; the whitespace between the two ranges is the
/// only normalization applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub char_range: Range<usize>,
    pub text_range: Range<usize>,
    pub boundary: ChunkBoundary,
}

impl Chunk {
    /// Number of Unicode scalar values in the chunk text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_oversized(&self) -> bool {
        self.boundary == ChunkBoundary::Oversized
    }
}

/// Rebuild the document from its chunks by slicing each owned range.
pub fn reconstruct(document: &str, chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| &document[chunk.char_range.clone()])
        .collect()
}
