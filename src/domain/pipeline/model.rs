use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFailure {
    pub index: usize,
    pub reason: String,
    pub kind: FailureKind,
    pub attempts: u32,
}

/// Merged audio of every successful chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Gap actually inserted between consecutive chunks
    pub silence: Duration,
}

/// Terminal artifact of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub total_chunks: usize,
    /// Ascending
    pub succeeded_indices: Vec<usize>,
    /// Ascending by index
    pub failures: Vec<ChunkFailure>,
    /// Chunks not finished because the run was cancelled, ascending
    pub skipped_indices: Vec<usize>,
    pub cancelled: bool,
    /// `None` when no chunk produced audio
    pub output: Option<AssembledAudio>,
}

impl PipelineReport {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped_indices.is_empty()
    }

    /// JSON-friendly view of the report without the audio payload
    pub fn summary(&self, run_id: Uuid) -> RunSummary {
        RunSummary {
            run_id,
            generated_at: Utc::now(),
            total_chunks: self.total_chunks,
            succeeded_indices: self.succeeded_indices.clone(),
            failures: self.failures.clone(),
            skipped_indices: self.skipped_indices.clone(),
            cancelled: self.cancelled,
            output: self.output.as_ref().map(|audio| OutputSummary {
                format: audio.format,
                size_bytes: audio.bytes.len(),
                silence_ms: audio.silence.as_millis() as u64,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSummary {
    pub format: AudioFormat,
    pub size_bytes: usize,
    pub silence_ms: u64,
}

/// Written next to the audio file so failed chunks can be retried later.
/// Segmentation is deterministic, so chunk indices stay valid across runs
/// with the same document and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_chunks: usize,
    pub succeeded_indices: Vec<usize>,
    pub failures: Vec<ChunkFailure>,
    pub skipped_indices: Vec<usize>,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSummary>,
}
