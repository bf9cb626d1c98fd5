pub mod cancellation;
pub mod error;
pub mod model;
pub mod processor;

pub use cancellation::{Cancellation, CancellationHandle};
pub use error::SynthesisError;
pub use model::{Backoff, ChunkOutcome, ChunkResult, FailureKind, RetryPolicy};
pub use processor::{ChunkProcessor, ProcessorConfig};
