use super::error::AssemblyError;
use super::format::{silence_frames, AudioFormat, MAX_SILENCE};
use crate::domain::pipeline::{AssembledAudio, ChunkFailure, PipelineReport};
use crate::domain::synthesis::{ChunkOutcome, ChunkResult, FailureKind};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::time::Duration;

/// Audio of one successful chunk, borrowed from its result
struct Part<'a> {
    index: usize,
    audio: &'a [u8],
    attempts: u32,
}

enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

struct DecodedWav {
    index: usize,
    spec: WavSpec,
    samples: Samples,
}

/// Merges per-chunk audio into one stream in chunk order.
///
/// A silence gap of the same length is placed between every pair of consecutive
/// chunks, never before the first or after the last. MP3 output does not get
/// gaps: the frames are joined as they are.
pub struct Assembler {
    format: AudioFormat,
    silence: Duration,
}

impl Assembler {
    pub fn new(format: AudioFormat, silence: Duration) -> Self {
        if !silence.is_zero() && !format.supports_silence() {
            tracing::warn!(
                format = %format,
                silence_ms = silence.as_millis(),
                "Silence gaps are not supported for this format, chunks will be joined directly"
            );
        }
        Self { format, silence }
    }

    /// Gap inserted between chunks for this format
    pub fn effective_silence(&self) -> Duration {
        if self.format.supports_silence() {
            self.silence
        } else {
            Duration::ZERO
        }
    }

    pub fn assemble(&self, results: &[ChunkResult]) -> Result<PipelineReport, AssemblyError> {
        if self.effective_silence() > MAX_SILENCE {
            return Err(AssemblyError::SilenceTooLong(self.silence));
        }

        let mut ordered: Vec<&ChunkResult> = results.iter().collect();
        ordered.sort_by_key(|result| result.index);

        let mut parts = Vec::new();
        let mut failures = Vec::new();
        let mut skipped_indices = Vec::new();

        for result in ordered {
            match &result.outcome {
                ChunkOutcome::Success { audio, attempts } if audio.is_empty() => {
                    tracing::warn!(
                        chunk_index = result.index,
                        "Backend returned an empty audio payload, dropping the chunk"
                    );
                    failures.push(ChunkFailure {
                        index: result.index,
                        reason: "empty audio payload".to_string(),
                        kind: FailureKind::InvalidAudio,
                        attempts: *attempts,
                    });
                }
                ChunkOutcome::Success { audio, attempts } => parts.push(Part {
                    index: result.index,
                    audio,
                    attempts: *attempts,
                }),
                ChunkOutcome::Failure {
                    reason,
                    kind,
                    attempts,
                } => failures.push(ChunkFailure {
                    index: result.index,
                    reason: reason.clone(),
                    kind: *kind,
                    attempts: *attempts,
                }),
                ChunkOutcome::Cancelled { .. } => skipped_indices.push(result.index),
            }
        }

        let (bytes, succeeded_indices) = match self.format {
            AudioFormat::Mp3 => join_with_gap(&parts, &[]),
            AudioFormat::Pcm {
                sample_rate,
                channels,
            } => {
                let gap_bytes = silence_frames(sample_rate, self.silence)
                    .checked_mul(usize::from(channels) * 2)
                    .ok_or(AssemblyError::SilenceTooLong(self.silence))?;
                join_with_gap(&parts, &vec![0u8; gap_bytes])
            }
            AudioFormat::Wav => self.merge_wav(&parts, &mut failures)?,
        };
        failures.sort_by_key(|failure| failure.index);

        let output = (!succeeded_indices.is_empty()).then(|| AssembledAudio {
            bytes,
            format: self.format,
            silence: self.effective_silence(),
        });

        let report = PipelineReport {
            total_chunks: results.len(),
            succeeded_indices,
            failures,
            cancelled: !skipped_indices.is_empty(),
            skipped_indices,
            output,
        };

        tracing::info!(
            total_chunks = report.total_chunks,
            succeeded = report.succeeded_indices.len(),
            failed = report.failures.len(),
            skipped = report.skipped_indices.len(),
            audio_size_bytes = report.output.as_ref().map(|o| o.bytes.len()).unwrap_or(0),
            "Audio assembled"
        );

        if report.output.is_none() {
            return Err(AssemblyError::NoAudioProduced {
                report: Box::new(report),
            });
        }

        Ok(report)
    }

    /// Decode every WAV part, check they share one spec and write a single file.
    /// Parts that fail to decode are moved to `failures`.
    fn merge_wav(
        &self,
        parts: &[Part<'_>],
        failures: &mut Vec<ChunkFailure>,
    ) -> Result<(Vec<u8>, Vec<usize>), AssemblyError> {
        let mut decoded: Vec<DecodedWav> = Vec::with_capacity(parts.len());

        for part in parts {
            match decode_wav(part) {
                Ok(wav) => {
                    if let Some(first) = decoded.first() {
                        if wav.spec != first.spec {
                            return Err(AssemblyError::FormatMismatch {
                                index: wav.index,
                                expected: describe(&first.spec),
                                actual: describe(&wav.spec),
                            });
                        }
                    }
                    decoded.push(wav);
                }
                Err(e) => {
                    tracing::warn!(
                        chunk_index = part.index,
                        error = %e,
                        "Chunk audio is not a readable WAV file, dropping it"
                    );
                    failures.push(ChunkFailure {
                        index: part.index,
                        reason: format!("undecodable WAV audio: {}", e),
                        kind: FailureKind::InvalidAudio,
                        attempts: part.attempts,
                    });
                }
            }
        }

        let Some(spec) = decoded.first().map(|wav| wav.spec) else {
            return Ok((Vec::new(), Vec::new()));
        };

        let gap_samples = silence_frames(spec.sample_rate, self.silence)
            .checked_mul(usize::from(spec.channels))
            .ok_or(AssemblyError::SilenceTooLong(self.silence))?;
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for (position, wav) in decoded.iter().enumerate() {
                if position > 0 {
                    for _ in 0..gap_samples {
                        match spec.sample_format {
                            SampleFormat::Int => writer.write_sample(0i32)?,
                            SampleFormat::Float => writer.write_sample(0.0f32)?,
                        }
                    }
                }
                match &wav.samples {
                    Samples::Int(samples) => {
                        for &sample in samples {
                            writer.write_sample(sample)?;
                        }
                    }
                    Samples::Float(samples) => {
                        for &sample in samples {
                            writer.write_sample(sample)?;
                        }
                    }
                }
            }
            writer.finalize()?;
        }

        let indices = decoded.iter().map(|wav| wav.index).collect();
        Ok((cursor.into_inner(), indices))
    }
}

fn join_with_gap(parts: &[Part<'_>], gap: &[u8]) -> (Vec<u8>, Vec<usize>) {
    let total: usize = parts.iter().map(|p| p.audio.len()).sum::<usize>()
        + gap.len() * parts.len().saturating_sub(1);
    let mut merged = Vec::with_capacity(total);

    for (position, part) in parts.iter().enumerate() {
        if position > 0 {
            merged.extend_from_slice(gap);
        }
        merged.extend_from_slice(part.audio);
    }

    (merged, parts.iter().map(|p| p.index).collect())
}

fn decode_wav(part: &Part<'_>) -> Result<DecodedWav, hound::Error> {
    let mut reader = WavReader::new(Cursor::new(part.audio))?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Int => Samples::Int(reader.samples::<i32>().collect::<Result<_, _>>()?),
        SampleFormat::Float => {
            Samples::Float(reader.samples::<f32>().collect::<Result<_, _>>()?)
        }
    };

    Ok(DecodedWav {
        index: part.index,
        spec,
        samples,
    })
}

fn describe(spec: &WavSpec) -> String {
    format!(
        "wav {}Hz/{}ch/{}bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    )
}
