use super::synthesis_client::SynthesisClient;
use crate::domain::assembly::AudioFormat;
use crate::domain::synthesis::SynthesisError;
use async_trait::async_trait;
use aws_sdk_polly::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::synthesize_speech::SynthesizeSpeechError,
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;
use std::time::Instant;

/// AWS Polly has a limit of 3000 characters per request
const MAX_INPUT_CHARS: usize = 3000;

/// Sample rate requested for PCM output
const PCM_SAMPLE_RATE: u32 = 16000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollyOutput {
    Mp3,
    /// Signed 16-bit little-endian mono at 16 kHz
    Pcm,
}

/// AWS Polly implementation of the synthesis client, always on the neural engine
pub struct PollySynthesisClient {
    polly_client: Arc<PollyClient>,
    output: PollyOutput,
}

impl PollySynthesisClient {
    pub fn new(polly_client: Arc<PollyClient>, output: PollyOutput) -> Self {
        Self {
            polly_client,
            output,
        }
    }
}

#[async_trait]
impl SynthesisClient for PollySynthesisClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let start_time = Instant::now();
        let voice_id = VoiceId::from(voice);
        let engine = Engine::Neural;

        tracing::debug!(
            voice = voice,
            voice_id = ?voice_id,
            engine = ?engine,
            output = ?self.output,
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let request = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .engine(engine);
        let request = match self.output {
            PollyOutput::Mp3 => request.output_format(OutputFormat::Mp3),
            PollyOutput::Pcm => request
                .output_format(OutputFormat::Pcm)
                .sample_rate(PCM_SAMPLE_RATE.to_string()),
        };

        let result = request.send().await.map_err(|e| {
            let error = classify(&e);
            tracing::error!(
                error = %DisplayErrorContext(&e),
                transient = error.is_transient(),
                voice = voice,
                text_length = text.len(),
                "AWS Polly synthesize_speech failed"
            );
            error
        })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::transient(format!("Failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::debug!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis() as u64,
            characters_count = text.chars().count(),
            audio_size_bytes = audio_bytes.len(),
            "Polly synthesis completed"
        );

        Ok(audio_bytes)
    }

    fn provider(&self) -> &'static str {
        "polly"
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    fn audio_format(&self) -> AudioFormat {
        match self.output {
            PollyOutput::Mp3 => AudioFormat::Mp3,
            PollyOutput::Pcm => AudioFormat::Pcm {
                sample_rate: PCM_SAMPLE_RATE,
                channels: 1,
            },
        }
    }
}

/// Timeouts, connection failures, unparseable responses, throttling and
/// service-side failures are worth retrying. Rejected input is not.
fn classify(err: &SdkError<SynthesizeSpeechError>) -> SynthesisError {
    let message = format!("AWS Polly error: {}", DisplayErrorContext(err));
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            SynthesisError::transient(message)
        }
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            if service_error.is_service_failure_exception()
                || service_error.code() == Some("ThrottlingException")
            {
                SynthesisError::transient(message)
            } else {
                SynthesisError::permanent(message)
            }
        }
        _ => SynthesisError::permanent(message),
    }
}
