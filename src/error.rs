use crate::domain::pipeline::PipelineError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline failed: {0}")]
    Pipeline(PipelineError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Pipeline(err) => err.exit_code(),
            Self::Io(_) | Self::Serialization(_) => 3,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
