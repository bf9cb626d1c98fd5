use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Container format of the audio returned by a synthesis backend.
/// Every chunk of one run is expected to share the same format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "codec")]
pub enum AudioFormat {
    /// MPEG audio frames; chunks are joined without re-encoding
    Mp3,
    /// RIFF/WAVE files; chunks are decoded and re-encoded into one file
    Wav,
    /// Headerless signed 16-bit little-endian samples
    Pcm { sample_rate: u32, channels: u16 },
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm { .. } => "pcm",
        }
    }

    /// Whether a silence gap can be inserted without decoding the stream
    pub fn supports_silence(&self) -> bool {
        !matches!(self, AudioFormat::Mp3)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Pcm {
                sample_rate,
                channels,
            } => write!(f, "pcm_s16le@{}Hz/{}ch", sample_rate, channels),
            other => write!(f, "{}", other.extension()),
        }
    }
}

/// Longest gap accepted between two chunks
pub const MAX_SILENCE: Duration = Duration::from_secs(10);

/// Number of sample frames covering `silence` at the given rate
pub fn silence_frames(sample_rate: u32, silence: Duration) -> usize {
    (u128::from(sample_rate) * silence.as_nanos() / 1_000_000_000) as usize
}
