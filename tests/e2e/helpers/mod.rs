use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use texttape::domain::assembly::AudioFormat;
use texttape::domain::pipeline::{PipelineConfig, PipelineCoordinator};
use texttape::domain::synthesis::{Backoff, CancellationHandle, SynthesisError};
use texttape::infrastructure::synthesis::SynthesisClient;

pub mod fixtures;

pub const WAV_SAMPLE_RATE: u32 = 8000;

type Response = Result<Vec<u8>, SynthesisError>;

/// In-process synthesis backend.
///
/// Answers are scripted per chunk text and consumed in order; once a script runs
/// out (or for unscripted text) the client succeeds with audio derived from the text.
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    format: AudioFormat,
    max_input_chars: usize,
    cancel_on: Option<(String, CancellationHandle)>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::ZERO,
            format: AudioFormat::Mp3,
            max_input_chars: 1000,
            cancel_on: None,
        }
    }

    pub fn with_script(self, text: &str, responses: Vec<Response>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(text.to_string(), responses.into());
        self
    }

    /// Every request for `text` fails permanently
    pub fn failing(self, text: &str) -> Self {
        let responses = (0..16)
            .map(|_| Err(SynthesisError::permanent(format!("rejected: {}", text))))
            .collect();
        self.with_script(text, responses)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Trigger the cancellation handle when `text` is requested
    pub fn cancelling_on(mut self, text: &str, handle: CancellationHandle) -> Self {
        self.cancel_on = Some((text.to_string(), handle));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls().iter().filter(|t| t.as_str() == text).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn default_audio(&self, text: &str) -> Vec<u8> {
        match self.format {
            AudioFormat::Wav => wav_for(text),
            _ => format!("<{}>", text).into_bytes(),
        }
    }
}

#[async_trait]
impl SynthesisClient for ScriptedClient {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((trigger, handle)) = &self.cancel_on {
            if trigger == text {
                handle.cancel();
            }
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(text)
            .and_then(|responses| responses.pop_front());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        scripted.unwrap_or_else(|| Ok(self.default_audio(text)))
    }

    fn provider(&self) -> &'static str {
        "scripted"
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    fn audio_format(&self) -> AudioFormat {
        self.format
    }
}

/// Mono 16-bit WAV with one sample per character of `text`, valued by its position
pub fn wav_for(text: &str) -> Vec<u8> {
    let samples: Vec<i16> = (1..=text.chars().count() as i16).collect();
    wav_from_samples(&samples)
}

pub fn wav_from_samples(samples: &[i16]) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: WAV_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

pub fn read_wav_samples(bytes: &[u8]) -> Vec<i16> {
    WavReader::new(Cursor::new(bytes))
        .unwrap()
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Pipeline settings for tests: no backoff delay, voice "test-voice"
pub fn pipeline_config(max_chunk_size: usize) -> PipelineConfig {
    let mut config = PipelineConfig::new("test-voice", max_chunk_size);
    config.backoff = Backoff::Fixed(Duration::ZERO);
    config
}

pub fn coordinator(client: Arc<ScriptedClient>, config: PipelineConfig) -> PipelineCoordinator {
    PipelineCoordinator::new(client, config)
}

/// Temporary working directory removed on drop
pub struct TestContext {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_input(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Failed to write input file");
        path
    }
}
