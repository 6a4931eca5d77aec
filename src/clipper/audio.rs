// SYNOID Audio Features
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// One feature vector per video, shared read-only by every candidate.

use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::clipper::error::ClipError;

/// RMS analysis window, in samples.
const FRAME_LEN: usize = 2048;
/// Hop between consecutive RMS windows, in samples.
const HOP_LEN: usize = 512;
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 200.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Estimated beats per minute.
    pub tempo: f64,
    /// Variance of frame RMS energy.
    pub energy_variance: f64,
    // Computed upstream, not read by the scoring rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_centroid_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_rolloff_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfcc_mean: Option<f64>,
}

impl AudioFeatures {
    pub fn new(tempo: f64, energy_variance: f64) -> Self {
        Self {
            tempo,
            energy_variance,
            ..Default::default()
        }
    }
}

/// Audio feature collaborator: one `AudioFeatures` per media source.
#[async_trait]
pub trait AudioFeatureSource: Send + Sync {
    async fn extract(&self, media: &Path) -> Result<AudioFeatures, ClipError>;
}

/// Features precomputed by an upstream analyzer and stored as JSON.
pub struct FeatureFile {
    path: PathBuf,
}

impl FeatureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AudioFeatureSource for FeatureFile {
    async fn extract(&self, _media: &Path) -> Result<AudioFeatures, ClipError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ClipError::FeatureExtraction(format!("{:?}: {}", self.path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ClipError::FeatureExtraction(format!("{:?}: {}", self.path, e)))
    }
}

/// Reads the media as a WAV file and derives tempo and energy variance.
pub struct WavFeatureExtractor;

impl WavFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_blocking(path: &Path) -> Result<AudioFeatures, ClipError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        // Downmix to mono
        let mono: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        info!(
            "[EARS] Decoded {} samples @ {} Hz ({} channel(s))",
            mono.len(),
            spec.sample_rate,
            channels
        );

        compute_features(&mono, spec.sample_rate)
    }
}

impl Default for WavFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioFeatureSource for WavFeatureExtractor {
    async fn extract(&self, media: &Path) -> Result<AudioFeatures, ClipError> {
        info!("[EARS] Analyzing audio energy: {:?}", media);
        let path = media.to_path_buf();
        let features = tokio::task::spawn_blocking(move || Self::extract_blocking(&path))
            .await
            .map_err(|e| ClipError::FeatureExtraction(e.to_string()))??;

        info!(
            "[EARS] tempo={:.1} BPM, energy_variance={:.5}",
            features.tempo, features.energy_variance
        );
        Ok(features)
    }
}

/// Tempo and energy variance of mono samples in `[-1, 1]`.
pub fn compute_features(samples: &[f32], sample_rate: u32) -> Result<AudioFeatures, ClipError> {
    if samples.is_empty() || sample_rate == 0 {
        return Err(ClipError::FeatureExtraction(
            "no audio samples to analyze".to_string(),
        ));
    }

    let rms = frame_rms(samples);
    let mean = rms.iter().sum::<f64>() / rms.len() as f64;
    let energy_variance = rms.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rms.len() as f64;

    let frame_rate = sample_rate as f64 / HOP_LEN as f64;
    let tempo = estimate_tempo(&rms, frame_rate);

    Ok(AudioFeatures::new(tempo, energy_variance))
}

fn frame_rms(samples: &[f32]) -> Vec<f64> {
    let rms_of = |chunk: &[f32]| {
        let sum_squares: f64 = chunk.iter().map(|&s| (s as f64).powi(2)).sum();
        (sum_squares / chunk.len() as f64).sqrt()
    };

    if samples.len() <= FRAME_LEN {
        return vec![rms_of(samples)];
    }

    (0..=(samples.len() - FRAME_LEN) / HOP_LEN)
        .map(|k| rms_of(&samples[k * HOP_LEN..k * HOP_LEN + FRAME_LEN]))
        .collect()
}

/// Autocorrelation of the positive RMS flux, searched over 60-200 BPM.
/// Returns 0.0 when there is no periodic energy to lock onto.
fn estimate_tempo(rms: &[f64], frame_rate: f64) -> f64 {
    let onsets: Vec<f64> = rms
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();

    let min_lag = (frame_rate * 60.0 / MAX_BPM).ceil().max(1.0) as usize;
    let max_lag = (frame_rate * 60.0 / MIN_BPM).floor() as usize;
    if onsets.len() <= min_lag || max_lag < min_lag {
        return 0.0;
    }

    let mut best_lag = 0;
    let mut best_corr = 0.0;
    for lag in min_lag..=max_lag.min(onsets.len() - 1) {
        let corr: f64 = onsets
            .iter()
            .zip(&onsets[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        0.0
    } else {
        60.0 * frame_rate / best_lag as f64
    }
}
