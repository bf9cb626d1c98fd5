pub mod error;
pub mod model;
pub mod service;

pub use error::PipelineError;
pub use model::{AssembledAudio, ChunkFailure, OutputSummary, PipelineReport, RunSummary};
pub use service::{PipelineConfig, PipelineCoordinator, PipelineServiceApi};
