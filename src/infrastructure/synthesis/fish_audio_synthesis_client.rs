use super::synthesis_client::SynthesisClient;
use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fish Audio rejects longer inputs on the standard plan
const MAX_INPUT_CHARS: usize = 2000;

pub const DEFAULT_BASE_URL: &str = "https://api.fish.audio";

/// Sample rate Fish Audio uses for PCM output
const PCM_SAMPLE_RATE: u32 = 44100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FishAudioFormat {
    Mp3,
    Wav,
    Pcm,
}

#[derive(Debug, Serialize)]
struct FishTtsRequest<'a> {
    text: &'a str,
    reference_id: &'a str,
    format: FishAudioFormat,
}

/// Fish Audio TTS over its HTTP API. The voice is a Fish Audio model reference id.
pub struct FishAudioSynthesisClient {
    client: Client,
    api_key: String,
    base_url: String,
    format: FishAudioFormat,
    /// Minimum spacing between the start of two requests
    request_interval: Duration,
    /// Earliest start of the next request
    next_slot: Mutex<Option<Instant>>,
}

impl FishAudioSynthesisClient {
    pub fn new(
        api_key: String,
        base_url: String,
        format: FishAudioFormat,
        request_interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            format,
            request_interval,
            next_slot: Mutex::new(None),
        })
    }
}

#[async_trait]
impl SynthesisClient for FishAudioSynthesisClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let start_time = Instant::now();
        let url = format!("{}/v1/tts", self.base_url);

        tracing::debug!(
            url = %url,
            reference_id = voice,
            format = ?self.format,
            text_length = text.len(),
            "Calling Fish Audio TTS API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&FishTtsRequest {
                text,
                reference_id: voice,
                format: self.format,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Fish Audio request failed");
                classify_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Fish Audio returned {}: {}", status, body.trim());
            let error = if is_retryable_status(status) {
                SynthesisError::transient(message)
            } else {
                SynthesisError::permanent(message)
            };
            tracing::error!(
                status = status.as_u16(),
                transient = error.is_transient(),
                reference_id = voice,
                "Fish Audio TTS API call failed"
            );
            return Err(error);
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::transient(format!("Failed to read Fish Audio response: {}", e)))?
            .to_vec();

        tracing::debug!(
            provider = "fish",
            latency_ms = start_time.elapsed().as_millis() as u64,
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "Fish Audio synthesis completed"
        );

        Ok(audio_bytes)
    }

    /// Reserve the next request slot and sleep until it opens. The lock is
    /// released before sleeping.
    async fn ready(&self) {
        if self.request_interval.is_zero() {
            return;
        }
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next_slot.map_or(now, |next| next.max(now));
            *next_slot = Some(slot + self.request_interval);
            slot
        };
        tokio::time::sleep_until(tokio::time::Instant::from_std(slot)).await;
    }

    fn provider(&self) -> &'static str {
        "fish"
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    fn audio_format(&self) -> AudioFormat {
        match self.format {
            FishAudioFormat::Mp3 => AudioFormat::Mp3,
            FishAudioFormat::Wav => AudioFormat::Wav,
            FishAudioFormat::Pcm => AudioFormat::Pcm {
                sample_rate: PCM_SAMPLE_RATE,
                channels: 1,
            },
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn classify_transport(err: &reqwest::Error) -> SynthesisError {
    let message = format!("Fish Audio request error: {}", err);
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        SynthesisError::transient(message)
    } else {
        SynthesisError::permanent(message)
    }
}
