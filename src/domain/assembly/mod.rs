pub mod error;
pub mod format;
pub mod service;

pub use error::AssemblyError;
pub use format::{silence_frames, AudioFormat, MAX_SILENCE};
pub use service::Assembler;
