// SYNOID Moment Selector
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use serde::Serialize;
use tracing::info;

use crate::clipper::candidates::Candidate;

/// Accepted windows in acceptance order (score-descending, not time order).
/// Pairwise non-overlapping under half-open interval semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectionResult {
    clips: Vec<Candidate>,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn clips(&self) -> &[Candidate] {
        &self.clips
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.clips.iter()
    }
}

impl<'a> IntoIterator for &'a SelectionResult {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}

/// Greedy non-overlapping top-K.
///
/// Candidates are stable-sorted by score, so equal scores keep input order
/// (earlier windows win). At most `min(max_count, hard_cap)` are accepted.
pub fn select(candidates: &[Candidate], max_count: usize, hard_cap: usize) -> SelectionResult {
    let limit = max_count.min(hard_cap);
    if candidates.is_empty() || limit == 0 {
        return SelectionResult::default();
    }

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut accepted: Vec<Candidate> = Vec::with_capacity(limit);
    for candidate in ranked {
        if accepted.iter().all(|kept| !candidate.overlaps(kept)) {
            accepted.push(candidate.clone());
            if accepted.len() >= limit {
                break;
            }
        }
    }

    info!(
        "[SELECT] Accepted {}/{} candidates (limit {})",
        accepted.len(),
        candidates.len(),
        limit
    );
    SelectionResult { clips: accepted }
}
