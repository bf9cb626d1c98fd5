use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transient errors until the retry budget ran out
    Transient,
    /// Non-retryable backend error
    Permanent,
    /// Backend answered but the bytes could not be decoded during assembly
    InvalidAudio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Success {
        audio: Vec<u8>,
        attempts: u32,
    },
    Failure {
        reason: String,
        kind: FailureKind,
        attempts: u32,
    },
    /// The run was cancelled before this chunk reached a terminal state
    Cancelled {
        attempts: u32,
    },
}

/// Outcome of one chunk, keyed by the chunk index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub outcome: ChunkOutcome,
}

impl ChunkResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match &self.outcome {
            ChunkOutcome::Success { attempts, .. }
            | ChunkOutcome::Failure { attempts, .. }
            | ChunkOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Delay between two attempts of the same chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// Doubles after every failed attempt, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}
