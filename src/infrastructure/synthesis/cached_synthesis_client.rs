use super::synthesis_client::SynthesisClient;
use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_CAPACITY: u64 = 1000;

/// Decorator that synthesizes each distinct (voice, text) pair once.
///
/// Concurrent requests for the same pair share one backend call. Errors are
/// never cached, so a retry after a transient failure reaches the backend again.
pub struct CachedSynthesisClient {
    inner: Arc<dyn SynthesisClient>,
    cache: Cache<(String, String), Vec<u8>>,
}

impl CachedSynthesisClient {
    pub fn new(inner: Arc<dyn SynthesisClient>) -> Self {
        Self::with_capacity(inner, DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(inner: Arc<dyn SynthesisClient>, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl SynthesisClient for CachedSynthesisClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let key = (voice.to_string(), text.to_string());

        if let Some(audio) = self.cache.get(&key).await {
            tracing::debug!(
                provider = self.inner.provider(),
                text_length = text.len(),
                audio_size = audio.len(),
                "Synthesis cache hit"
            );
            return Ok(audio);
        }

        self.cache
            .try_get_with(key, self.inner.synthesize(text, voice))
            .await
            .map_err(|e: Arc<SynthesisError>| e.as_ref().clone())
    }

    async fn ready(&self) {
        self.inner.ready().await
    }

    fn provider(&self) -> &'static str {
        self.inner.provider()
    }

    fn max_input_chars(&self) -> usize {
        self.inner.max_input_chars()
    }

    fn audio_format(&self) -> AudioFormat {
        self.inner.audio_format()
    }
}
