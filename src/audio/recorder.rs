//! Microphone capture into a WAV file.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use hound::{WavSpec, WavWriter};

use crate::config::RecordFormatSetting;

use super::probe::whole_seconds;
use super::types::AudioError;

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Sample layout written to disk. Picked once, before recording starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordFormat {
    Wav16,
    WavFloat,
}

impl RecordFormat {
    pub(crate) fn spec(self, channels: u16, sample_rate: u32) -> WavSpec {
        match self {
            RecordFormat::Wav16 => WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            RecordFormat::WavFloat => WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        }
    }
}

impl From<RecordFormatSetting> for RecordFormat {
    fn from(s: RecordFormatSetting) -> Self {
        match s {
            RecordFormatSetting::Wav16 => RecordFormat::Wav16,
            RecordFormatSetting::WavFloat => RecordFormat::WavFloat,
        }
    }
}

/// A finished recording on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub path: PathBuf,
    pub duration_seconds: u32,
}

/// An in-progress capture from the default input device.
///
/// Dropping a `Recorder` without calling [`Recorder::finish`] stops capture
/// and leaves a possibly truncated file behind.
pub struct Recorder {
    stream: cpal::Stream,
    writer: SharedWriter,
    frames: Arc<AtomicU64>,
    sample_rate: u32,
    path: PathBuf,
}

impl Recorder {
    pub fn start(path: &Path, format: RecordFormat) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;
        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::Input(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| AudioError::Open {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let writer = WavWriter::create(path, format.spec(config.channels, sample_rate)).map_err(
            |source| AudioError::Write {
                path: path.to_path_buf(),
                source,
            },
        )?;
        let writer: SharedWriter = Arc::new(Mutex::new(Some(writer)));
        let frames = Arc::new(AtomicU64::new(0));

        let stream = match sample_format {
            SampleFormat::F32 => build_input::<f32>(&device, &config, format, &writer, &frames)?,
            SampleFormat::I16 => build_input::<i16>(&device, &config, format, &writer, &frames)?,
            SampleFormat::U16 => build_input::<u16>(&device, &config, format, &writer, &frames)?,
            other => {
                return Err(AudioError::Input(format!(
                    "unsupported input sample format {other}"
                )));
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::Input(e.to_string()))?;

        tracing::info!(?path, sample_rate, channels = config.channels, "recording started");
        Ok(Self {
            stream,
            writer,
            frames,
            sample_rate,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length captured so far.
    pub fn elapsed(&self) -> Duration {
        frames_to_duration(self.frames.load(Ordering::Relaxed), self.sample_rate)
    }

    /// Stop capture and finalize the WAV header.
    pub fn finish(self) -> Result<Recording, AudioError> {
        let Recorder {
            stream,
            writer,
            frames,
            sample_rate,
            path,
        } = self;
        drop(stream);

        let taken = writer.lock().ok().and_then(|mut w| w.take());
        if let Some(w) = taken {
            w.finalize().map_err(|source| AudioError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let duration = frames_to_duration(frames.load(Ordering::Relaxed), sample_rate);
        tracing::info!(?path, secs = duration.as_secs_f64(), "recording finished");
        Ok(Recording {
            path,
            duration_seconds: whole_seconds(duration),
        })
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    format: RecordFormat,
    writer: &SharedWriter,
    frames: &Arc<AtomicU64>,
) -> Result<cpal::Stream, AudioError>
where
    T: Sample + SizedSample,
    f32: FromSample<T>,
{
    let channels = u64::from(config.channels.max(1));
    let writer = Arc::clone(writer);
    let frames = Arc::clone(frames);
    let err_fn = |err: cpal::StreamError| {
        tracing::warn!(error = %err, "input stream error");
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let Ok(mut guard) = writer.lock() else {
                    return;
                };
                let Some(w) = guard.as_mut() else {
                    return;
                };
                for &s in data {
                    let v = f32::from_sample(s);
                    let written = match format {
                        RecordFormat::Wav16 => w.write_sample(to_i16(v)),
                        RecordFormat::WavFloat => w.write_sample(v),
                    };
                    if written.is_err() {
                        return;
                    }
                }
                frames.fetch_add(data.len() as u64 / channels, Ordering::Relaxed);
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::Input(e.to_string()))
}

pub(crate) fn to_i16(v: f32) -> i16 {
    (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

pub(crate) fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
}
