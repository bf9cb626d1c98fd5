#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentationError {
    #[error("invalid chunk budget: max_chunk_size must be positive")]
    InvalidBudget,
    #[error("invalid sentence terminators: {0}")]
    InvalidTerminators(String),
    #[error("word of {word_chars} characters at byte {offset} exceeds the chunk budget of {max_chunk_size}")]
    WordExceedsBudget {
        offset: usize,
        word_chars: usize,
        max_chunk_size: usize,
    },
}
