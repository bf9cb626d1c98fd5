use crate::domain::pipeline::PipelineReport;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// Not a single chunk produced usable audio. The report lists every failure.
    #[error("no audio produced from {} chunks", .report.total_chunks)]
    NoAudioProduced { report: Box<PipelineReport> },
    #[error("chunk {index} has audio format {actual}, expected {expected}")]
    FormatMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("silence gap of {0:?} is too long")]
    SilenceTooLong(Duration),
    #[error("failed to encode assembled audio: {0}")]
    Encode(#[from] hound::Error),
}
