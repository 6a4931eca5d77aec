// SYNOID Clip Strategy
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::clipper::error::ClipError;
use crate::clipper::scoring::ScoringRules;

const STRATEGY_FILE: &str = "clip_strategy.json";

/// What to do when the classifier fails for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole run with the first classifier error.
    Abort,
    /// Drop the candidate and keep going.
    DropCandidate,
}

/// Tunables for a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipStrategy {
    pub min_clip_duration: f64,
    pub max_clip_duration: f64,
    /// Upper bound on clips a caller may request.
    pub max_clips: usize,
    /// Selector safety bound, applied independently of `max_clips`.
    pub selection_hard_cap: usize,
    /// A window may absorb segments ending up to this multiple of the target.
    pub extension_factor: f64,
    /// Concurrent classifier calls.
    pub classifier_workers: usize,
    pub classifier_timeout_secs: u64,
    pub api_url: String,
    pub classifier_model: String,
    pub failure_policy: FailurePolicy,
    pub rules: ScoringRules,
}

impl Default for ClipStrategy {
    fn default() -> Self {
        Self {
            min_clip_duration: 15.0,
            max_clip_duration: 120.0,
            max_clips: 5,
            selection_hard_cap: 5,
            extension_factor: 1.5,
            classifier_workers: 4,
            classifier_timeout_secs: 30,
            api_url: "http://localhost:11434/v1".to_string(),
            classifier_model: "llama3:latest".to_string(),
            failure_policy: FailurePolicy::Abort,
            rules: ScoringRules::default(),
        }
    }
}

impl ClipStrategy {
    /// `clip_strategy.json` from the working directory, else defaults.
    /// `SYNOID_API_URL` and `SYNOID_CLASSIFIER_MODEL` override the endpoint.
    pub fn load() -> Self {
        let mut strategy = match fs::read_to_string(STRATEGY_FILE) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(config) if config.validate().is_ok() => {
                    info!("[CLIPPER] Loaded clip strategy from {}", STRATEGY_FILE);
                    config
                }
                Ok(_) => {
                    warn!("[CLIPPER] Ignoring invalid {}, using defaults", STRATEGY_FILE);
                    Self::default()
                }
                Err(e) => {
                    warn!("[CLIPPER] Ignoring malformed {}: {}", STRATEGY_FILE, e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("[CLIPPER] Using default clip strategy");
                Self::default()
            }
        };
        strategy.apply_env();
        strategy
    }

    /// Strict variant for an explicitly named file: errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ClipError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ClipError::Config(format!("{:?}: {}", path, e)))?;
        let mut strategy: Self = serde_json::from_str(&content)
            .map_err(|e| ClipError::Config(format!("{:?}: {}", path, e)))?;
        info!("[CLIPPER] Loaded clip strategy from {:?}", path);
        strategy.apply_env();
        strategy.validate()?;
        Ok(strategy)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SYNOID_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("SYNOID_CLASSIFIER_MODEL") {
            self.classifier_model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ClipError> {
        if !(self.min_clip_duration > 0.0 && self.min_clip_duration <= self.max_clip_duration) {
            return Err(ClipError::Config(format!(
                "clip duration range [{}, {}] is invalid",
                self.min_clip_duration, self.max_clip_duration
            )));
        }
        if self.max_clips == 0 || self.selection_hard_cap == 0 {
            return Err(ClipError::Config(
                "max_clips and selection_hard_cap must be at least 1".to_string(),
            ));
        }
        if !(self.extension_factor >= 1.0 && self.extension_factor.is_finite()) {
            return Err(ClipError::Config(format!(
                "extension_factor must be >= 1, got {}",
                self.extension_factor
            )));
        }
        if self.classifier_workers == 0 {
            return Err(ClipError::Config(
                "classifier_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn clamp_duration(&self, requested: f64) -> f64 {
        requested
            .min(self.max_clip_duration)
            .max(self.min_clip_duration)
    }

    pub fn clamp_count(&self, requested: usize) -> usize {
        requested.min(self.max_clips).max(1)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}
