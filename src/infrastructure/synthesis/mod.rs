pub mod cached_synthesis_client;
pub mod fish_audio_synthesis_client;
pub mod openai_synthesis_client;
pub mod polly_synthesis_client;
pub mod synthesis_client;

pub use cached_synthesis_client::CachedSynthesisClient;
pub use fish_audio_synthesis_client::{FishAudioFormat, FishAudioSynthesisClient};
pub use openai_synthesis_client::OpenAiSynthesisClient;
pub use polly_synthesis_client::{PollyOutput, PollySynthesisClient};
pub use synthesis_client::SynthesisClient;

use crate::error::AppError;
use crate::infrastructure::config::{Config, TtsProvider};
use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use std::sync::Arc;

/// Instantiate the synthesis client selected by the configuration
pub async fn build_client(config: &Config) -> Result<Arc<dyn SynthesisClient>, AppError> {
    let client: Arc<dyn SynthesisClient> = match config.provider {
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let polly_client = aws_sdk_polly::Client::new(&aws_config);

            Arc::new(PollySynthesisClient::new(
                Arc::new(polly_client),
                config.polly_output,
            ))
        }
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;
            let openai_client = OpenAiClient::with_config(OpenAIConfig::new().with_api_key(api_key));

            Arc::new(OpenAiSynthesisClient::new(
                Arc::new(openai_client),
                config.openai_tts_model.clone(),
            ))
        }
        TtsProvider::Fish => {
            let api_key = config
                .fish_api_key
                .clone()
                .ok_or_else(|| AppError::Config("FISH_API_KEY is not set".to_string()))?;

            Arc::new(
                FishAudioSynthesisClient::new(
                    api_key,
                    config.fish_api_base_url.clone(),
                    config.fish_audio_format,
                    config.fish_request_interval,
                )
                .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?,
            )
        }
    };

    tracing::info!(
        provider = client.provider(),
        max_input_chars = client.max_input_chars(),
        audio_format = %client.audio_format(),
        cache_enabled = config.synthesis_cache_enabled,
        "Synthesis client initialized"
    );

    if config.synthesis_cache_enabled {
        return Ok(Arc::new(CachedSynthesisClient::new(client)));
    }

    Ok(client)
}
