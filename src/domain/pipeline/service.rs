use super::error::PipelineError;
use super::model::PipelineReport;
use crate::domain::assembly::{Assembler, MAX_SILENCE};
use crate::domain::segment::{Segmenter, SegmenterConfig};
use crate::domain::synthesis::{
    Backoff, Cancellation, ChunkProcessor, ProcessorConfig, RetryPolicy,
};
use crate::infrastructure::synthesis::SynthesisClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on characters per chunk
    pub max_chunk_size: usize,
    pub voice: String,
    pub max_retries: u32,
    pub backoff: Backoff,
    pub concurrency: usize,
    /// Pause inserted between consecutive chunks
    pub silence: Duration,
    pub segmenter: SegmenterConfig,
}

impl PipelineConfig {
    pub fn new(voice: impl Into<String>, max_chunk_size: usize) -> Self {
        let retry = RetryPolicy::default();
        Self {
            max_chunk_size,
            voice: voice.into(),
            max_retries: retry.max_retries,
            backoff: retry.backoff,
            concurrency: ProcessorConfig::default().concurrency,
            silence: Duration::ZERO,
            segmenter: SegmenterConfig::default(),
        }
    }

    fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            retry: RetryPolicy {
                max_retries: self.max_retries,
                backoff: self.backoff,
            },
            concurrency: self.concurrency,
        }
    }
}

pub struct PipelineCoordinator {
    client: Arc<dyn SynthesisClient>,
    config: PipelineConfig,
}

impl PipelineCoordinator {
    pub fn new(client: Arc<dyn SynthesisClient>, config: PipelineConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
pub trait PipelineServiceApi: Send + Sync {
    /// Turn a document into one audio stream
    ///
    /// This operation:
    /// - Validates the configuration against the synthesis backend
    /// - Segments the document into chunks
    /// - Synthesizes every chunk, retrying transient failures
    /// - Assembles the successful chunks in order
    ///
    /// A run where some chunks fail still returns `Ok`; the report lists them.
    async fn run(&self, document: &str) -> Result<PipelineReport, PipelineError>;

    /// Like [`run`](Self::run), stopping new synthesis requests once cancelled
    async fn run_with_cancellation(
        &self,
        document: &str,
        cancellation: Cancellation,
    ) -> Result<PipelineReport, PipelineError>;

    /// Same as [`run_with_cancellation`](Self::run_with_cancellation) under a caller-chosen run id
    async fn run_with_id(
        &self,
        run_id: Uuid,
        document: &str,
        cancellation: Cancellation,
    ) -> Result<PipelineReport, PipelineError>;
}

#[async_trait]
impl PipelineServiceApi for PipelineCoordinator {
    async fn run(&self, document: &str) -> Result<PipelineReport, PipelineError> {
        self.run_with_cancellation(document, Cancellation::never())
            .await
    }

    async fn run_with_cancellation(
        &self,
        document: &str,
        cancellation: Cancellation,
    ) -> Result<PipelineReport, PipelineError> {
        self.run_with_id(Uuid::new_v4(), document, cancellation)
            .await
    }

    async fn run_with_id(
        &self,
        run_id: Uuid,
        document: &str,
        cancellation: Cancellation,
    ) -> Result<PipelineReport, PipelineError> {
        let span = tracing::info_span!(
            "pipeline_run",
            run_id = %run_id,
            provider = self.client.provider(),
        );
        self.execute(document, cancellation).instrument(span).await
    }
}

impl PipelineCoordinator {
    async fn execute(
        &self,
        document: &str,
        cancellation: Cancellation,
    ) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();

        // 1. Validate before anything is sent to the backend
        self.validate()?;
        if document.trim().is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        // 2. Segment
        let segmenter = Segmenter::new(self.config.segmenter.clone())?;
        let chunks = segmenter.segment(document, self.config.max_chunk_size)?;
        if chunks.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        tracing::info!(
            document_length = document.len(),
            chunk_count = chunks.len(),
            max_chunk_size = self.config.max_chunk_size,
            oversized = chunks.iter().filter(|c| c.is_oversized()).count(),
            "Document segmented"
        );

        // 3. Synthesize
        let processor = ChunkProcessor::new(self.client.clone(), self.config.processor_config());
        let results = processor
            .process_with_cancellation(&chunks, &self.config.voice, cancellation)
            .await;

        // 4. Assemble
        let assembler = Assembler::new(self.client.audio_format(), self.config.silence);
        let report = match assembler.assemble(&results) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Pipeline run produced no audio"
                );
                return Err(e.into());
            }
        };

        if report.is_complete() {
            tracing::info!(
                total_chunks = report.total_chunks,
                duration_ms = started.elapsed().as_millis() as u64,
                "Pipeline run completed"
            );
        } else {
            tracing::warn!(
                total_chunks = report.total_chunks,
                succeeded = report.succeeded_indices.len(),
                failed_indices = ?report.failed_indices(),
                skipped_indices = ?report.skipped_indices,
                cancelled = report.cancelled,
                duration_ms = started.elapsed().as_millis() as u64,
                "Pipeline run completed with missing chunks"
            );
        }

        Ok(report)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let limit = self.client.max_input_chars();

        if self.config.max_chunk_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_chunk_size must be positive".to_string(),
            ));
        }
        if self.config.max_chunk_size > limit {
            return Err(PipelineError::InvalidConfig(format!(
                "max_chunk_size {} exceeds the {} limit of {} characters",
                self.config.max_chunk_size,
                self.client.provider(),
                limit
            )));
        }
        if self.config.voice.trim().is_empty() {
            return Err(PipelineError::InvalidConfig("voice must not be empty".to_string()));
        }
        if self.config.concurrency == 0 {
            return Err(PipelineError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.config.silence > MAX_SILENCE {
            return Err(PipelineError::InvalidConfig(format!(
                "silence of {} ms exceeds the maximum of {} ms",
                self.config.silence.as_millis(),
                MAX_SILENCE.as_millis()
            )));
        }

        Ok(())
    }
}
