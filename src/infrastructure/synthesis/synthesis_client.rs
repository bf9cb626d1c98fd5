use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;

/// Boundary to a text-to-speech backend (AWS Polly, OpenAI, Fish Audio, ...).
///
/// Implementations synthesize exactly the text they are given. Splitting long
/// documents, retrying and merging audio happen in the pipeline, not here.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Synthesize one bounded chunk of text with the given voice
    ///
    /// # Arguments
    /// * `text` - Chunk text, at most `max_input_chars()` characters
    /// * `voice` - Provider-specific voice identifier
    ///
    /// # Errors
    /// [`SynthesisError::Transient`] for faults worth retrying,
    /// [`SynthesisError::Permanent`] for everything else
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError>;

    /// Resolves once the backend may receive another request. Awaited before every
    /// attempt and dropped if the run is cancelled first, so nothing is sent.
    async fn ready(&self) {}

    /// Short provider name used in logs
    fn provider(&self) -> &'static str;

    /// Largest input the service accepts in one request, in characters
    fn max_input_chars(&self) -> usize;

    /// Container format of every audio payload this client returns
    fn audio_format(&self) -> AudioFormat;
}
