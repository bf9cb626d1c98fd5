use crate::domain::assembly::AudioFormat;
use crate::domain::pipeline::PipelineConfig;
use crate::domain::segment::{OversizePolicy, SegmenterConfig};
use crate::domain::synthesis::Backoff;
use crate::error::AppError;
use crate::infrastructure::synthesis::fish_audio_synthesis_client::DEFAULT_BASE_URL;
use crate::infrastructure::synthesis::openai_synthesis_client::DEFAULT_MODEL;
use crate::infrastructure::synthesis::{FishAudioFormat, PollyOutput};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: TtsProvider,
    pub input_text_file: PathBuf,
    /// Defaults to `output.<ext>` for the provider's audio format
    pub output_audio_file: Option<PathBuf>,
    /// Defaults to `<output>.report.json`
    pub report_file: Option<PathBuf>,
    pub voice: String,
    pub max_chunk_size: usize,
    pub max_retries: u32,
    pub retry_backoff: Backoff,
    pub concurrency: usize,
    pub silence: Duration,
    pub sentence_terminators: String,
    pub oversize_policy: OversizePolicy,
    pub clean_text: bool,
    pub synthesis_cache_enabled: bool,
    pub log_format: LogFormat,
    // AWS Polly
    pub aws_region: String,
    pub polly_output: PollyOutput,
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    // Fish Audio
    pub fish_api_key: Option<String>,
    pub fish_api_base_url: String,
    pub fish_audio_format: FishAudioFormat,
    pub fish_request_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsProvider {
    Fish,
    Polly,
    OpenAi,
}

impl FromStr for TtsProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fish" => Ok(TtsProvider::Fish),
            "polly" => Ok(TtsProvider::Polly),
            "openai" => Ok(TtsProvider::OpenAi),
            other => Err(AppError::Config(format!("unknown TTS_PROVIDER: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from the process environment and an optional `.env` file
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let provider: TtsProvider = var_or("TTS_PROVIDER", "fish").parse()?;

        let voice = match (var("VOICE"), provider) {
            (Some(voice), _) => voice,
            (None, TtsProvider::Polly) => "Joanna".to_string(),
            (None, TtsProvider::OpenAi) => "alloy".to_string(),
            (None, TtsProvider::Fish) => {
                return Err(AppError::Config(
                    "VOICE (a Fish Audio reference id) is required for the fish provider"
                        .to_string(),
                ))
            }
        };

        let retry_delay = Duration::from_millis(parse(&var, "RETRY_DELAY_MS", 500)?);
        let retry_backoff = match var_or("RETRY_BACKOFF", "exponential").to_lowercase().as_str() {
            "exponential" => Backoff::Exponential {
                initial: retry_delay,
                max: Duration::from_millis(parse(&var, "RETRY_MAX_DELAY_MS", 8000)?),
            },
            "fixed" => Backoff::Fixed(retry_delay),
            other => {
                return Err(AppError::Config(format!("unknown RETRY_BACKOFF: {}", other)));
            }
        };

        let oversize_policy = match var_or("OVERSIZE_POLICY", "split").to_lowercase().as_str() {
            "split" => OversizePolicy::Split,
            "keep" => OversizePolicy::KeepSentence,
            "strict" => OversizePolicy::Strict,
            other => {
                return Err(AppError::Config(format!("unknown OVERSIZE_POLICY: {}", other)));
            }
        };

        let polly_output = match var_or("POLLY_OUTPUT_FORMAT", "mp3").to_lowercase().as_str() {
            "mp3" => PollyOutput::Mp3,
            "pcm" => PollyOutput::Pcm,
            other => {
                return Err(AppError::Config(format!("unknown POLLY_OUTPUT_FORMAT: {}", other)));
            }
        };

        let fish_audio_format = match var_or("FISH_AUDIO_FORMAT", "mp3").to_lowercase().as_str() {
            "mp3" => FishAudioFormat::Mp3,
            "wav" => FishAudioFormat::Wav,
            "pcm" => FishAudioFormat::Pcm,
            other => {
                return Err(AppError::Config(format!("unknown FISH_AUDIO_FORMAT: {}", other)));
            }
        };

        let config = Config {
            provider,
            input_text_file: PathBuf::from(var_or("INPUT_TEXT_FILE", "input.txt")),
            output_audio_file: var("OUTPUT_AUDIO_FILE").map(PathBuf::from),
            report_file: var("REPORT_FILE").map(PathBuf::from),
            voice,
            max_chunk_size: parse(&var, "MAX_CHUNK_SIZE", 1800)?,
            max_retries: parse(&var, "MAX_RETRIES", 3)?,
            retry_backoff,
            concurrency: parse(&var, "CONCURRENCY", 4)?,
            silence: Duration::from_millis(parse(&var, "SILENCE_MS", 0)?),
            sentence_terminators: var_or("SENTENCE_TERMINATORS", ".!?"),
            oversize_policy,
            clean_text: parse_flag(&var, "CLEAN_TEXT", true),
            synthesis_cache_enabled: parse_flag(&var, "SYNTHESIS_CACHE_ENABLED", false),
            log_format: match var_or("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            aws_region: var_or("AWS_REGION", "eu-west-1"),
            polly_output,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_tts_model: var_or("OPENAI_TTS_MODEL", DEFAULT_MODEL),
            fish_api_key: var("FISH_API_KEY"),
            fish_api_base_url: var_or("FISH_API_BASE_URL", DEFAULT_BASE_URL),
            fish_audio_format,
            fish_request_interval: Duration::from_millis(parse(&var, "FISH_REQUEST_INTERVAL_MS", 500)?),
        };

        config.check_credentials()?;
        Ok(config)
    }

    fn check_credentials(&self) -> Result<(), AppError> {
        match self.provider {
            TtsProvider::Fish if self.fish_api_key.is_none() => Err(AppError::Config(
                "FISH_API_KEY is required for the fish provider".to_string(),
            )),
            TtsProvider::OpenAi if self.openai_api_key.is_none() => Err(AppError::Config(
                "OPENAI_API_KEY is required for the openai provider".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_chunk_size: self.max_chunk_size,
            voice: self.voice.clone(),
            max_retries: self.max_retries,
            backoff: self.retry_backoff,
            concurrency: self.concurrency,
            silence: self.silence,
            segmenter: SegmenterConfig {
                terminators: self.sentence_terminators.clone(),
                oversize_policy: self.oversize_policy,
                ..SegmenterConfig::default()
            },
        }
    }

    pub fn output_path(&self, format: AudioFormat) -> PathBuf {
        self.output_audio_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("output.{}", format.extension())))
    }

    pub fn report_path(&self, output: &Path) -> PathBuf {
        self.report_file.clone().unwrap_or_else(|| {
            let mut name = output.as_os_str().to_owned();
            name.push(".report.json");
            PathBuf::from(name)
        })
    }
}

fn parse<T, F>(var: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {}={}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_flag<F>(var: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
