// SYNOID Candidate Windows
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Every transcript segment seeds one window that grows forward until it
// reaches the target duration. Windows overlap heavily; the selector
// resolves that later.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::clipper::error::ClipError;
use crate::clipper::transcription::TranscriptSegment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub duration: f64,
    /// Virality score in `[0, 10]`, set by the scorer.
    pub score: f64,
    pub source_segments: Vec<TranscriptSegment>,
}

impl Candidate {
    /// Half-open `[start, end)` overlap.
    pub fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Grow the window seeded at `segments[first]`.
///
/// A following segment is absorbed while the window is shorter than
/// `target_duration` and the absorbed end stays within
/// `extension_factor * target_duration` of the window start.
pub fn build_window(
    segments: &[TranscriptSegment],
    first: usize,
    target_duration: f64,
    extension_factor: f64,
) -> Candidate {
    let seed = &segments[first];
    let limit = target_duration * extension_factor;

    let mut duration = seed.duration();
    let mut last = first;
    let mut j = first + 1;
    while j < segments.len() && duration < target_duration {
        let next = &segments[j];
        if next.end - seed.start <= limit {
            duration = next.end - seed.start;
            last = j;
            j += 1;
        } else {
            break;
        }
    }

    let source_segments = segments[first..=last].to_vec();
    let text = source_segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let end = source_segments[source_segments.len() - 1].end;

    Candidate {
        start: seed.start,
        end,
        text,
        duration: end - seed.start,
        score: 0.0,
        source_segments,
    }
}

/// One candidate per starting segment, in segment order.
///
/// Windows are independent, so they are built on the rayon pool. The caller
/// is responsible for clamping `target_duration` into its accepted range.
pub fn build_candidates(
    segments: &[TranscriptSegment],
    target_duration: f64,
    extension_factor: f64,
) -> Result<Vec<Candidate>, ClipError> {
    if !target_duration.is_finite() || target_duration <= 0.0 {
        return Err(ClipError::InvalidInput(format!(
            "target duration must be positive, got {}",
            target_duration
        )));
    }
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let candidates: Vec<Candidate> = (0..segments.len())
        .into_par_iter()
        .map(|i| build_window(segments, i, target_duration, extension_factor))
        .collect();

    info!(
        "[CLIPPER] Built {} candidate windows (target {:.0}s)",
        candidates.len(),
        target_duration
    );
    Ok(candidates)
}
