pub mod error;
pub mod model;
pub mod service;

pub use error::SegmentationError;
pub use model::{reconstruct, Chunk, ChunkBoundary};
pub use service::{segment, OversizePolicy, Segmenter, SegmenterConfig};
