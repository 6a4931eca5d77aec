// SYNOID Moment Finder
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// transcript + audio features -> candidate windows -> scores -> selection.
// Rendering the accepted windows is the caller's business.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::clipper::audio::{AudioFeatureSource, AudioFeatures};
use crate::clipper::candidates::{build_candidates, Candidate};
use crate::clipper::classifier::{ChatClassifier, ClassifierKind, TextClassifier};
use crate::clipper::error::ClipError;
use crate::clipper::scoring::Scorer;
use crate::clipper::selector::{select, SelectionResult};
use crate::clipper::strategy::{ClipStrategy, FailurePolicy};
use crate::clipper::transcription::{validate_segments, TranscriptSegment, TranscriptSource};

const PREVIEW_CHARS: usize = 200;

pub struct MomentFinder {
    strategy: ClipStrategy,
    scorer: Arc<Scorer>,
}

impl MomentFinder {
    pub fn new(
        strategy: ClipStrategy,
        sentiment: Arc<dyn TextClassifier>,
        emotion: Arc<dyn TextClassifier>,
    ) -> Result<Self, ClipError> {
        strategy.validate()?;
        let scorer = Scorer::new(strategy.rules.clone(), sentiment, emotion)?;
        Ok(Self {
            strategy,
            scorer: Arc::new(scorer),
        })
    }

    /// Sentiment and emotion both served by the strategy's chat endpoint.
    pub fn with_chat_classifiers(strategy: ClipStrategy) -> Result<Self, ClipError> {
        let timeout = strategy.classifier_timeout();
        let sentiment = ChatClassifier::new(
            &strategy.api_url,
            &strategy.classifier_model,
            ClassifierKind::Sentiment,
            timeout,
        )?;
        let emotion = ChatClassifier::new(
            &strategy.api_url,
            &strategy.classifier_model,
            ClassifierKind::Emotion,
            timeout,
        )?;
        Self::new(strategy, Arc::new(sentiment), Arc::new(emotion))
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Pick up to `requested_count` non-overlapping windows of roughly
    /// `target_duration` seconds.
    ///
    /// Both requests are clamped into the strategy's ranges first. An empty
    /// transcript yields an empty selection, not an error.
    pub async fn select_best_moments(
        &self,
        segments: &[TranscriptSegment],
        audio: &AudioFeatures,
        target_duration: f64,
        requested_count: usize,
    ) -> Result<SelectionResult, ClipError> {
        if !target_duration.is_finite() || target_duration <= 0.0 {
            return Err(ClipError::InvalidInput(format!(
                "target duration must be positive, got {}",
                target_duration
            )));
        }
        validate_segments(segments)?;

        let target = self.strategy.clamp_duration(target_duration);
        let count = self.strategy.clamp_count(requested_count);
        info!(
            "[CLIPPER] 🔍 Analyzing {} segments for viral potential (target {:.0}s, {} clip(s))",
            segments.len(),
            target,
            count
        );

        // The rayon build is CPU-bound; keep it off the async workers.
        let owned = segments.to_vec();
        let extension_factor = self.strategy.extension_factor;
        let candidates = tokio::task::spawn_blocking(move || {
            build_candidates(&owned, target, extension_factor)
        })
        .await??;
        if candidates.is_empty() {
            return Ok(SelectionResult::default());
        }

        let scored = self.score_all(candidates, audio).await?;
        Ok(select(&scored, count, self.strategy.selection_hard_cap))
    }

    /// Score every candidate with at most `classifier_workers` in flight.
    /// Output keeps the input order so score ties resolve to earlier windows.
    async fn score_all(
        &self,
        candidates: Vec<Candidate>,
        audio: &AudioFeatures,
    ) -> Result<Vec<Candidate>, ClipError> {
        let total = candidates.len();
        let audio = Arc::new(audio.clone());
        let permits = Arc::new(Semaphore::new(self.strategy.classifier_workers));
        let mut tasks = JoinSet::new();

        for (index, mut candidate) in candidates.into_iter().enumerate() {
            let scorer = self.scorer.clone();
            let audio = audio.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = scorer.score_candidate(&mut candidate, &audio).await;
                (index, candidate, outcome)
            });
        }

        let mut scored: Vec<(usize, Candidate)> = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            let (index, candidate, outcome) = joined?;

            match outcome {
                Ok(_) => scored.push((index, candidate)),
                Err(e) => match self.strategy.failure_policy {
                    FailurePolicy::Abort => {
                        error!(
                            "[SCORER] Aborting run at {:.1}s-{:.1}s: {}",
                            candidate.start, candidate.end, e
                        );
                        tasks.abort_all();
                        return Err(e);
                    }
                    FailurePolicy::DropCandidate => {
                        warn!(
                            "[SCORER] Dropping candidate {:.1}s-{:.1}s ({}/{}): {}",
                            candidate.start,
                            candidate.end,
                            self.scorer.sentiment_id(),
                            self.scorer.emotion_id(),
                            e
                        );
                    }
                },
            }
        }

        scored.sort_by_key(|(index, _)| *index);
        info!("[SCORER] Scored {}/{} candidates", scored.len(), total);
        Ok(scored.into_iter().map(|(_, c)| c).collect())
    }

    /// Run the collaborators for one media file, then select.
    ///
    /// Feature extraction failures propagate. A transcription failure means
    /// there is nothing to clip and yields an empty selection.
    pub async fn process_media(
        &self,
        media: &Path,
        transcripts: &dyn TranscriptSource,
        features: &dyn AudioFeatureSource,
        target_duration: f64,
        requested_count: usize,
    ) -> Result<SelectionResult, ClipError> {
        info!("[CLIPPER] 🎧 Extracting audio features...");
        let audio = features.extract(media).await?;

        info!("[CLIPPER] 📝 Transcribing...");
        let segments = match transcripts.transcribe(media).await {
            Ok(segments) => segments,
            Err(e) => {
                warn!("[CLIPPER] Transcription unavailable, nothing to clip: {}", e);
                Vec::new()
            }
        };

        self.select_best_moments(&segments, &audio, target_duration, requested_count)
            .await
    }
}

/// One row of the clip summary handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipInfo {
    pub clip_number: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub virality_score: f64,
    pub text_preview: String,
    pub source_video: String,
}

pub fn clip_report(selection: &SelectionResult, source_video: &str) -> Vec<ClipInfo> {
    selection
        .iter()
        .enumerate()
        .map(|(i, clip)| ClipInfo {
            clip_number: i + 1,
            start_time: clip.start,
            end_time: clip.end,
            duration: clip.duration,
            virality_score: clip.score,
            text_preview: text_preview(&clip.text),
            source_video: source_video.to_string(),
        })
        .collect()
}

fn text_preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::classifier::{ClassifierSignal, StubClassifier};
    use async_trait::async_trait;

    struct PanickingClassifier;

    #[async_trait]
    impl TextClassifier for PanickingClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierSignal, ClipError> {
            panic!("model handle poisoned");
        }

        fn classifier_id(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_panicked_scoring_task_is_internal_error() {
        let strategy = ClipStrategy {
            failure_policy: FailurePolicy::DropCandidate,
            ..Default::default()
        };
        let finder = MomentFinder::new(
            strategy,
            Arc::new(PanickingClassifier),
            Arc::new(StubClassifier::neutral("emotion")),
        )
        .unwrap();
        let segments = vec![TranscriptSegment::new(0.0, 30.0, "watch this")];
        let audio = AudioFeatures::new(90.0, 0.0);

        let err = finder
            .select_best_moments(&segments, &audio, 30.0, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ClipError::Internal(_)));
        assert!(!err.is_collaborator_failure());
    }

    #[test]
    fn test_text_preview_truncates_by_chars() {
        assert_eq!(text_preview("short"), "short");

        let exact = "a".repeat(200);
        assert_eq!(text_preview(&exact), exact);

        let long = "é".repeat(250);
        let preview = text_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }
}
