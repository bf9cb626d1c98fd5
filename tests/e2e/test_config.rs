use std::collections::HashMap;
use texttape::domain::assembly::AudioFormat;
use texttape::error::AppError;
use texttape::infrastructure::config::{Config, TtsProvider};
use texttape::infrastructure::synthesis::build_client;

fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[tokio::test]
async fn it_should_build_a_fish_client_from_config() {
    let config = config_from(&[
        ("FISH_API_KEY", "key"),
        ("VOICE", "reference-id"),
        ("FISH_AUDIO_FORMAT", "wav"),
    ])
    .unwrap();

    let client = build_client(&config).await.unwrap();

    assert_eq!(config.provider, TtsProvider::Fish);
    assert_eq!(client.provider(), "fish");
    assert_eq!(client.audio_format(), AudioFormat::Wav);
    assert!(config.max_chunk_size <= client.max_input_chars());
}

#[tokio::test]
async fn it_should_wrap_the_client_in_a_cache_when_enabled() {
    let config = config_from(&[
        ("TTS_PROVIDER", "openai"),
        ("OPENAI_API_KEY", "sk-test"),
        ("SYNTHESIS_CACHE_ENABLED", "true"),
    ])
    .unwrap();

    let client = build_client(&config).await.unwrap();

    assert_eq!(client.provider(), "openai");
    assert_eq!(client.max_input_chars(), 4096);
    assert_eq!(client.audio_format(), AudioFormat::Mp3);
}

#[test]
fn it_should_map_config_errors_to_exit_code_two() {
    let err = config_from(&[("TTS_PROVIDER", "fish")]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}
