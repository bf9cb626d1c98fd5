use super::error::SegmentationError;
use super::model::{Chunk, ChunkBoundary};
use regex::Regex;
use std::ops::Range;

/// Characters that end a sentence unless configured otherwise
pub const DEFAULT_TERMINATORS: &str = ".!?";

/// Closing quotes and brackets allowed between a terminator and the following whitespace
pub const DEFAULT_CLOSERS: &str = "\"')]}\u{201D}\u{2019}\u{00BB}";

/// What to do with a single sentence longer than the chunk budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
    /// Split between words, and inside a word only when the word alone is too long
    #[default]
    Split,
    /// Keep the sentence whole as one oversized chunk
    KeepSentence,
    /// Split between words, reject words longer than the budget
    Strict,
}

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub terminators: String,
    pub closers: String,
    pub oversize_policy: OversizePolicy,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            terminators: DEFAULT_TERMINATORS.to_string(),
            closers: DEFAULT_CLOSERS.to_string(),
            oversize_policy: OversizePolicy::default(),
        }
    }
}

/// Splits documents into chunks that fit a synthesis request.
///
/// Sentences are found in one forward pass of a regex built from the configured
/// terminators: one or more terminators, optional closing quotes or brackets, then
/// whitespace or the end of the text. Sentences are packed greedily; a chunk is
/// closed as soon as the next sentence would bring it to the budget or beyond.
/// A sentence that alone exceeds the budget goes through the [`OversizePolicy`].
pub struct Segmenter {
    sentence_pattern: Regex,
    oversize_policy: OversizePolicy,
}

struct OpenChunk {
    range: Range<usize>,
    chars: usize,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self, SegmentationError> {
        let terminators = escape_class(&config.terminators);
        if terminators.is_empty() {
            return Err(SegmentationError::InvalidTerminators(
                "terminator set is empty".to_string(),
            ));
        }

        let closers = escape_class(&config.closers);
        let pattern = if closers.is_empty() {
            format!(r"[{}]+(?:\s+|$)", terminators)
        } else {
            format!(r"[{}]+[{}]*(?:\s+|$)", terminators, closers)
        };

        let sentence_pattern = Regex::new(&pattern)
            .map_err(|e| SegmentationError::InvalidTerminators(e.to_string()))?;

        Ok(Self {
            sentence_pattern,
            oversize_policy: config.oversize_policy,
        })
    }

    /// Split `text` into chunks of at most `max_chunk_size` characters
    pub fn segment(
        &self,
        text: &str,
        max_chunk_size: usize,
    ) -> Result<Vec<Chunk>, SegmentationError> {
        if max_chunk_size == 0 {
            return Err(SegmentationError::InvalidBudget);
        }

        let mut pieces: Vec<(Range<usize>, ChunkBoundary)> = Vec::new();
        let mut open: Option<OpenChunk> = None;

        for sentence in self.sentence_ranges(text) {
            let sentence_chars = text[sentence.clone()].chars().count();

            if sentence_chars > max_chunk_size {
                if let Some(chunk) = open.take() {
                    pieces.push((chunk.range, ChunkBoundary::Sentence));
                }
                self.split_oversized(text, sentence, max_chunk_size, &mut pieces)?;
                continue;
            }

            open = Some(match open.take() {
                Some(chunk) => {
                    let gap_chars = text[chunk.range.end..sentence.start].chars().count();
                    let merged_chars = chunk.chars + gap_chars + sentence_chars;

                    if merged_chars < max_chunk_size {
                        OpenChunk {
                            range: chunk.range.start..sentence.end,
                            chars: merged_chars,
                        }
                    } else {
                        pieces.push((chunk.range, ChunkBoundary::Sentence));
                        OpenChunk {
                            range: sentence,
                            chars: sentence_chars,
                        }
                    }
                }
                None => OpenChunk {
                    range: sentence,
                    chars: sentence_chars,
                },
            });
        }

        if let Some(chunk) = open {
            pieces.push((chunk.range, ChunkBoundary::Sentence));
        }

        let chunks = build_chunks(text, pieces);

        tracing::debug!(
            text_length = text.len(),
            max_chunk_size = max_chunk_size,
            chunk_count = chunks.len(),
            oversized = chunks.iter().filter(|c| c.is_oversized()).count(),
            "Text segmented"
        );

        Ok(chunks)
    }

    /// Trimmed byte ranges of every non-empty sentence, in order
    fn sentence_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut last_end = 0;

        for mat in self.sentence_pattern.find_iter(text) {
            ranges.extend(trimmed(text, last_end..mat.end()));
            last_end = mat.end();
        }

        // Text after the last terminator, or the whole text if there is none
        if last_end < text.len() {
            ranges.extend(trimmed(text, last_end..text.len()));
        }

        ranges
    }

    fn split_oversized(
        &self,
        text: &str,
        sentence: Range<usize>,
        max_chunk_size: usize,
        pieces: &mut Vec<(Range<usize>, ChunkBoundary)>,
    ) -> Result<(), SegmentationError> {
        if self.oversize_policy == OversizePolicy::KeepSentence {
            pieces.push((sentence, ChunkBoundary::Oversized));
            return Ok(());
        }

        let mut start = sentence.start;
        while start < sentence.end {
            // Byte offset of the first character past the budget
            let cut = match text[start..sentence.end].char_indices().nth(max_chunk_size) {
                Some((offset, _)) => start + offset,
                None => {
                    pieces.push((start..sentence.end, ChunkBoundary::Sentence));
                    break;
                }
            };

            let split_at = if text[cut..].starts_with(char::is_whitespace) {
                Some(cut)
            } else {
                text[start..cut]
                    .rfind(char::is_whitespace)
                    .map(|offset| start + offset)
            };

            match split_at {
                Some(whitespace) => {
                    let piece_end = start + text[start..whitespace].trim_end().len();
                    if piece_end > start {
                        pieces.push((start..piece_end, ChunkBoundary::Whitespace));
                    }
                    start = skip_whitespace(text, whitespace, sentence.end);
                }
                None if self.oversize_policy == OversizePolicy::Strict => {
                    let word_chars = text[start..sentence.end]
                        .split(char::is_whitespace)
                        .next()
                        .map(|word| word.chars().count())
                        .unwrap_or(0);
                    return Err(SegmentationError::WordExceedsBudget {
                        offset: start,
                        word_chars,
                        max_chunk_size,
                    });
                }
                None => {
                    pieces.push((start..cut, ChunkBoundary::Forced));
                    start = cut;
                }
            }
        }

        Ok(())
    }
}

/// Segment with the default terminators and oversize policy
pub fn segment(text: &str, max_chunk_size: usize) -> Result<Vec<Chunk>, SegmentationError> {
    Segmenter::new(SegmenterConfig::default())?.segment(text, max_chunk_size)
}

fn escape_class(chars: &str) -> String {
    chars
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect()
}

fn trimmed(text: &str, range: Range<usize>) -> Option<Range<usize>> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.start + slice.trim_end().len();
    (start < end).then_some(start..end)
}

fn skip_whitespace(text: &str, from: usize, end: usize) -> usize {
    let slice = &text[from..end];
    from + (slice.len() - slice.trim_start().len())
}

/// Turn trimmed text ranges into chunks whose owned ranges tile the whole text.
/// Whitespace between two pieces belongs to the earlier chunk, leading whitespace
/// to the first and trailing whitespace to the last.
fn build_chunks(text: &str, pieces: Vec<(Range<usize>, ChunkBoundary)>) -> Vec<Chunk> {
    let last = pieces.len().saturating_sub(1);
    let mut owned_start = 0;

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, (range, boundary))| {
            let owned_end = if index == last {
                text.len()
            } else {
                range.end
            };
            let chunk = Chunk {
                index,
                text: text[range.clone()].to_string(),
                char_range: owned_start..owned_end,
                text_range: range,
                boundary,
            };
            owned_start = owned_end;
            chunk
        })
        .collect()
}
