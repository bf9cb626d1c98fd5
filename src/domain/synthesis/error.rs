/// Failure reported by a synthesis backend for a single request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// Network faults, timeouts, throttling, server errors. Worth retrying.
    #[error("transient synthesis error: {0}")]
    Transient(String),
    /// Bad voice id, rejected input, auth failures. Retrying cannot help.
    #[error("permanent synthesis error: {0}")]
    Permanent(String),
}

impl SynthesisError {
    pub fn transient(message: impl Into<String>) -> Self {
        SynthesisError::Transient(message.into())
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        SynthesisError::Permanent(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}
