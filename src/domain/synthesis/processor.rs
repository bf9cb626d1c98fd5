use super::cancellation::Cancellation;
use super::error::SynthesisError;
use super::model::{ChunkOutcome, ChunkResult, FailureKind, RetryPolicy};
use crate::domain::segment::Chunk;
use crate::infrastructure::synthesis::SynthesisClient;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub retry: RetryPolicy,
    /// Maximum synthesis requests in flight
    pub concurrency: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            concurrency: 4,
        }
    }
}

/// Life of one chunk inside the processor
#[derive(Debug)]
enum ChunkState {
    Pending,
    Attempting { attempt: u32 },
    Succeeded { audio: Vec<u8>, attempts: u32 },
    FailedTransient { attempt: u32, error: SynthesisError },
    FailedPermanent { attempt: u32, error: SynthesisError },
}

/// Drives chunks through a [`SynthesisClient`] with retries and failure isolation.
///
/// Each chunk runs in its own task, at most `concurrency` at a time. Tasks report
/// back through the join set to a single collector that owns one slot per chunk,
/// so completion order never leaks into the result order.
pub struct ChunkProcessor {
    client: Arc<dyn SynthesisClient>,
    config: ProcessorConfig,
}

impl ChunkProcessor {
    pub fn new(client: Arc<dyn SynthesisClient>, config: ProcessorConfig) -> Self {
        Self { client, config }
    }

    /// Synthesize every chunk; returns one result per chunk sorted by chunk index
    pub async fn process(&self, chunks: &[Chunk], voice: &str) -> Vec<ChunkResult> {
        self.process_with_cancellation(chunks, voice, Cancellation::never())
            .await
    }

    /// Like [`process`](Self::process), but stops issuing requests once cancelled.
    /// In-flight requests run to completion; chunks never dispatched come back as
    /// [`ChunkOutcome::Cancelled`].
    pub async fn process_with_cancellation(
        &self,
        chunks: &[Chunk],
        voice: &str,
        cancellation: Cancellation,
    ) -> Vec<ChunkResult> {
        let total = chunks.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let voice: Arc<str> = Arc::from(voice);
        let mut tasks = JoinSet::new();
        let mut dispatched = 0;

        for (position, chunk) in chunks.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = cancellation.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                tracing::warn!(
                    dispatched = dispatched,
                    total_chunks = total,
                    "Cancellation requested, no further chunks will be submitted"
                );
                break;
            };

            let client = self.client.clone();
            let voice = voice.clone();
            let cancellation = cancellation.clone();
            let retry = self.config.retry;
            let index = chunk.index;
            let text = chunk.text.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let outcome =
                    drive_chunk(client.as_ref(), index, &text, &voice, retry, &cancellation).await;
                (position, ChunkResult { index, outcome })
            });
            dispatched += 1;
        }

        let mut slots: Vec<Option<ChunkResult>> = vec![None; total];
        let mut completed = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => {
                    completed += 1;
                    tracing::info!(
                        chunk_index = result.index,
                        success = result.is_success(),
                        attempts = result.attempts(),
                        completed = completed,
                        total_chunks = total,
                        "Chunk finished"
                    );
                    slots[position] = Some(result);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Chunk task aborted");
                }
            }
        }

        let mut results: Vec<ChunkResult> = chunks
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(position, (chunk, slot))| {
                slot.unwrap_or_else(|| ChunkResult {
                    index: chunk.index,
                    outcome: if position < dispatched {
                        ChunkOutcome::Failure {
                            reason: "synthesis task aborted".to_string(),
                            kind: FailureKind::Permanent,
                            attempts: 0,
                        }
                    } else {
                        ChunkOutcome::Cancelled { attempts: 0 }
                    },
                })
            })
            .collect();

        results.sort_by_key(|result| result.index);
        results
    }
}

/// Run one chunk's state machine to a terminal outcome
async fn drive_chunk(
    client: &dyn SynthesisClient,
    index: usize,
    text: &str,
    voice: &str,
    retry: RetryPolicy,
    cancellation: &Cancellation,
) -> ChunkOutcome {
    let mut state = ChunkState::Pending;

    loop {
        state = match state {
            ChunkState::Pending => ChunkState::Attempting { attempt: 1 },

            ChunkState::Attempting { attempt } => {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {
                        return ChunkOutcome::Cancelled {
                            attempts: attempt - 1,
                        };
                    }
                    _ = client.ready() => {}
                }

                tracing::debug!(
                    chunk_index = index,
                    attempt = attempt,
                    provider = client.provider(),
                    text_length = text.len(),
                    "Synthesizing chunk"
                );

                let start_time = Instant::now();
                match client.synthesize(text, voice).await {
                    Ok(audio) => {
                        tracing::debug!(
                            chunk_index = index,
                            attempt = attempt,
                            latency_ms = start_time.elapsed().as_millis(),
                            audio_size_bytes = audio.len(),
                            "Chunk synthesized"
                        );
                        ChunkState::Succeeded {
                            audio,
                            attempts: attempt,
                        }
                    }
                    Err(error) if error.is_transient() => {
                        ChunkState::FailedTransient { attempt, error }
                    }
                    Err(error) => ChunkState::FailedPermanent { attempt, error },
                }
            }

            ChunkState::FailedTransient { attempt, error } => {
                if attempt > retry.max_retries {
                    tracing::error!(
                        chunk_index = index,
                        attempts = attempt,
                        error = %error,
                        "Chunk failed, retries exhausted"
                    );
                    return ChunkOutcome::Failure {
                        reason: error.to_string(),
                        kind: FailureKind::Transient,
                        attempts: attempt,
                    };
                }

                let delay = retry.backoff.delay_after(attempt);
                tracing::warn!(
                    chunk_index = index,
                    attempt = attempt,
                    max_retries = retry.max_retries,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Transient synthesis failure, retrying"
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => ChunkState::Attempting { attempt: attempt + 1 },
                    _ = cancellation.cancelled() => {
                        return ChunkOutcome::Cancelled { attempts: attempt };
                    }
                }
            }

            ChunkState::FailedPermanent { attempt, error } => {
                tracing::error!(
                    chunk_index = index,
                    attempts = attempt,
                    error = %error,
                    "Chunk failed permanently"
                );
                return ChunkOutcome::Failure {
                    reason: error.to_string(),
                    kind: FailureKind::Permanent,
                    attempts: attempt,
                };
            }

            ChunkState::Succeeded { audio, attempts } => {
                return ChunkOutcome::Success { audio, attempts };
            }
        };
    }
}
