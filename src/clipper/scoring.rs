// SYNOID Virality Scorer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Additive, thresholded scoring. Every weight and threshold is data in
// `ScoringRules` so it can be tuned from `clip_strategy.json`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::clipper::audio::AudioFeatures;
use crate::clipper::candidates::Candidate;
use crate::clipper::classifier::{ClassifierSignal, TextClassifier};
use crate::clipper::error::ClipError;

const VIRAL_KEYWORDS: &[&str] = &[
    "wow", "amazing", "incredible", "unbelievable", "shocking", "surprise", "secret", "trick",
    "hack", "tip", "mistake", "fail", "success", "breakthrough", "discovery", "reveal", "expose",
    "truth", "lie", "before", "after", "transformation", "change", "upgrade", "improve", "money",
    "rich", "poor", "expensive", "cheap", "free", "save", "love", "hate", "angry", "happy", "sad",
    "funny", "laugh", "cry", "first time", "last time", "never", "always", "everyone", "nobody",
    "finally", "suddenly", "immediately", "instantly", "quickly",
];

const HOOK_PATTERNS: &[&str] = &[
    r"you won't believe",
    r"this will change",
    r"nobody talks about",
    r"the truth about",
    r"what happens when",
    r"here's what",
    r"this is why",
    r"the secret",
    r"watch this",
    r"wait for it",
];

const HIGH_ENGAGEMENT_EMOTIONS: &[&str] = &["surprise", "excitement", "anger", "joy"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub positive_sentiment: f64,
    pub negative_sentiment: f64,
    pub engaging_emotion: f64,
    pub keyword: f64,
    pub hook: f64,
    pub fast_tempo: f64,
    pub dynamic_energy: f64,
    pub duration_sweet_spot: f64,
    pub duration_acceptable: f64,
    pub word_count: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            positive_sentiment: 2.0,
            negative_sentiment: 1.5,
            engaging_emotion: 2.0,
            keyword: 1.0,
            hook: 3.0,
            fast_tempo: 1.0,
            dynamic_energy: 1.0,
            duration_sweet_spot: 2.0,
            duration_acceptable: 1.0,
            word_count: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    /// Sentiment confidence must exceed this.
    pub sentiment_confidence: f64,
    /// Emotion confidence must exceed this.
    pub emotion_confidence: f64,
    /// Tempo must exceed this (BPM).
    pub tempo_bpm: f64,
    /// Energy variance must exceed this.
    pub energy_variance: f64,
    /// Inclusive duration bounds, seconds.
    pub sweet_spot: (f64, f64),
    pub acceptable: (f64, f64),
    /// Inclusive whitespace-split word count bounds.
    pub word_count: (usize, usize),
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            sentiment_confidence: 0.8,
            emotion_confidence: 0.7,
            tempo_bpm: 120.0,
            energy_variance: 0.01,
            sweet_spot: (25.0, 65.0),
            acceptable: (15.0, 90.0),
            word_count: (20, 100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub keywords: Vec<String>,
    pub hook_patterns: Vec<String>,
    pub engaging_emotions: Vec<String>,
    pub weights: ScoreWeights,
    pub thresholds: ScoreThresholds,
    pub max_score: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            keywords: VIRAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            hook_patterns: HOOK_PATTERNS.iter().map(|p| p.to_string()).collect(),
            engaging_emotions: HIGH_ENGAGEMENT_EMOTIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            weights: ScoreWeights::default(),
            thresholds: ScoreThresholds::default(),
            max_score: 10.0,
        }
    }
}

/// Per-signal contributions, in the order they are summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub sentiment: f64,
    pub emotion: f64,
    pub keywords: f64,
    pub hooks: f64,
    pub tempo: f64,
    pub energy: f64,
    pub duration: f64,
    pub length: f64,
}

impl ScoreBreakdown {
    pub fn raw(&self) -> f64 {
        self.sentiment
            + self.emotion
            + self.keywords
            + self.hooks
            + self.tempo
            + self.energy
            + self.duration
            + self.length
    }

    pub fn clamped(&self, max_score: f64) -> f64 {
        self.raw().clamp(0.0, max_score)
    }
}

/// Scoring rules compiled once, plus the two classifier handles.
pub struct Scorer {
    rules: ScoringRules,
    keywords: Vec<String>,
    hooks: Vec<Regex>,
    sentiment: Arc<dyn TextClassifier>,
    emotion: Arc<dyn TextClassifier>,
}

impl Scorer {
    pub fn new(
        rules: ScoringRules,
        sentiment: Arc<dyn TextClassifier>,
        emotion: Arc<dyn TextClassifier>,
    ) -> Result<Self, ClipError> {
        if !rules.max_score.is_finite() || rules.max_score <= 0.0 {
            return Err(ClipError::Config(format!(
                "max_score must be positive, got {}",
                rules.max_score
            )));
        }

        let hooks = rules
            .hook_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let keywords = rules.keywords.iter().map(|k| k.to_lowercase()).collect();
        debug!(
            "[SCORER] {} hook patterns, classifiers {} / {}",
            hooks.len(),
            sentiment.classifier_id(),
            emotion.classifier_id()
        );

        Ok(Self {
            rules,
            keywords,
            hooks,
            sentiment,
            emotion,
        })
    }

    pub fn sentiment_id(&self) -> &str {
        self.sentiment.classifier_id()
    }

    pub fn emotion_id(&self) -> &str {
        self.emotion.classifier_id()
    }

    /// Pure scoring of already-classified text.
    pub fn breakdown(
        &self,
        text: &str,
        duration: f64,
        audio: &AudioFeatures,
        sentiment: &ClassifierSignal,
        emotion: &ClassifierSignal,
    ) -> ScoreBreakdown {
        let w = &self.rules.weights;
        let t = &self.rules.thresholds;
        let text_lower = text.to_lowercase();

        let sentiment_score = if sentiment.confidence > t.sentiment_confidence {
            match sentiment.label.as_str() {
                "POSITIVE" => w.positive_sentiment,
                "NEGATIVE" => w.negative_sentiment,
                _ => 0.0,
            }
        } else {
            0.0
        };

        let emotion_label = emotion.label.to_lowercase();
        let emotion_score = if emotion.confidence > t.emotion_confidence
            && self
                .rules
                .engaging_emotions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&emotion_label))
        {
            w.engaging_emotion
        } else {
            0.0
        };

        let keyword_hits = self
            .keywords
            .iter()
            .filter(|k| text_lower.contains(k.as_str()))
            .count();
        let hook_hits = self.hooks.iter().filter(|h| h.is_match(&text_lower)).count();

        let duration_score = if t.sweet_spot.0 <= duration && duration <= t.sweet_spot.1 {
            w.duration_sweet_spot
        } else if t.acceptable.0 <= duration && duration <= t.acceptable.1 {
            w.duration_acceptable
        } else {
            0.0
        };

        let words = text.split_whitespace().count();
        let length_score = if t.word_count.0 <= words && words <= t.word_count.1 {
            w.word_count
        } else {
            0.0
        };

        ScoreBreakdown {
            sentiment: sentiment_score,
            emotion: emotion_score,
            keywords: keyword_hits as f64 * w.keyword,
            hooks: hook_hits as f64 * w.hook,
            tempo: if audio.tempo > t.tempo_bpm { w.fast_tempo } else { 0.0 },
            energy: if audio.energy_variance > t.energy_variance {
                w.dynamic_energy
            } else {
                0.0
            },
            duration: duration_score,
            length: length_score,
        }
    }

    /// Final score in `[0, max_score]`.
    pub fn score(
        &self,
        candidate: &Candidate,
        audio: &AudioFeatures,
        sentiment: &ClassifierSignal,
        emotion: &ClassifierSignal,
    ) -> f64 {
        self.breakdown(&candidate.text, candidate.duration, audio, sentiment, emotion)
            .clamped(self.rules.max_score)
    }

    /// Classify the combined text once per signal type, then score.
    ///
    /// A classifier failure is returned as-is; no fallback score is
    /// substituted.
    pub async fn score_candidate(
        &self,
        candidate: &mut Candidate,
        audio: &AudioFeatures,
    ) -> Result<f64, ClipError> {
        let sentiment = self.sentiment.classify(&candidate.text).await?;
        let emotion = self.emotion.classify(&candidate.text).await?;

        let score = self.score(candidate, audio, &sentiment, &emotion);
        debug!(
            "[SCORER] {:.1}s-{:.1}s -> {:.1} ({} {} {:.2}, {} {} {:.2})",
            candidate.start,
            candidate.end,
            score,
            self.sentiment.classifier_id(),
            sentiment.label,
            sentiment.confidence,
            self.emotion.classifier_id(),
            emotion.label,
            emotion.confidence
        );
        candidate.score = score;
        Ok(score)
    }
}
