use super::synthesis_client::SynthesisClient;
use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::SynthesisError;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// OpenAI has a limit of 4096 characters per request
const MAX_INPUT_CHARS: usize = 4096;

pub const DEFAULT_MODEL: &str = "tts-1";

/// OpenAI TTS implementation of the synthesis client
pub struct OpenAiSynthesisClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSynthesisClient {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

/// Map a voice name onto the voices the API knows
pub fn parse_voice(voice: &str) -> Option<Voice> {
    match voice.to_lowercase().as_str() {
        "alloy" => Some(Voice::Alloy),
        "echo" => Some(Voice::Echo),
        "fable" => Some(Voice::Fable),
        "onyx" => Some(Voice::Onyx),
        "nova" => Some(Voice::Nova),
        "shimmer" => Some(Voice::Shimmer),
        _ => None,
    }
}

#[async_trait]
impl SynthesisClient for OpenAiSynthesisClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let start_time = Instant::now();

        let voice_enum = parse_voice(voice).ok_or_else(|| {
            SynthesisError::permanent(format!("unknown OpenAI voice: {}", voice))
        })?;

        tracing::debug!(
            model = %self.model,
            voice = voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: voice_enum,
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            let error = classify(e);
            tracing::error!(
                error = %error,
                transient = error.is_transient(),
                model = %self.model,
                voice = voice,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            error
        })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::debug!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis() as u64,
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI synthesis completed"
        );

        Ok(audio_bytes)
    }

    fn provider(&self) -> &'static str {
        "openai"
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }
}

/// Network failures, rate limits and server errors are transient
fn classify(err: OpenAIError) -> SynthesisError {
    match &err {
        OpenAIError::Reqwest(_) => SynthesisError::transient(format!("OpenAI TTS error: {}", err)),
        OpenAIError::ApiError(api) => {
            // Rate limits come back as "requests" or "tokens"
            let kind = api.r#type.as_deref().unwrap_or_default();
            if matches!(kind, "server_error" | "requests" | "tokens") {
                SynthesisError::transient(format!("OpenAI TTS error: {}", err))
            } else {
                SynthesisError::permanent(format!("OpenAI TTS error: {}", err))
            }
        }
        _ => SynthesisError::permanent(format!("OpenAI TTS error: {}", err)),
    }
}
