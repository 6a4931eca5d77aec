use std::sync::Arc;
use synoid_clipper::clipper::audio::AudioFeatures;
use synoid_clipper::clipper::candidates::build_candidates;
use synoid_clipper::clipper::classifier::{ClassifierSignal, StubClassifier};
use synoid_clipper::clipper::selector::select;
use synoid_clipper::clipper::strategy::{ClipStrategy, FailurePolicy};
use synoid_clipper::clipper::transcription::TranscriptSegment;
use synoid_clipper::clipper::{ClipError, MomentFinder};

fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
    TranscriptSegment::new(start, end, text)
}

fn quiet() -> AudioFeatures {
    AudioFeatures::new(90.0, 0.001)
}

fn hook_transcript() -> Vec<TranscriptSegment> {
    vec![
        seg(0.0, 10.0, "normal text"),
        seg(10.0, 40.0, "you won't believe this incredible secret"),
        seg(40.0, 70.0, "more text"),
    ]
}

fn finder_with(strategy: ClipStrategy) -> MomentFinder {
    MomentFinder::new(
        strategy,
        Arc::new(StubClassifier::neutral("sentiment")),
        Arc::new(StubClassifier::neutral("emotion")),
    )
    .unwrap()
}

/// Deterministic pseudo-random transcript: variable gaps, lengths and hooks.
fn synthetic_transcript(seed: u64, count: usize) -> Vec<TranscriptSegment> {
    let phrases = [
        "and then we kept going",
        "you won't believe what happens when the secret gets out",
        "this is why nobody talks about it",
        "wait for it",
        "just some ordinary words here",
        "money money money",
    ];
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    let mut t = 0.0;
    (0..count)
        .map(|_| {
            let start = t + (next() % 3) as f64;
            let end = start + 2.0 + (next() % 25) as f64;
            t = end;
            seg(start, end, phrases[next() % phrases.len()])
        })
        .collect()
}

#[tokio::test]
async fn test_hook_window_scores_and_selection() {
    let finder = finder_with(ClipStrategy::default());
    let segments = hook_transcript();

    let candidates = build_candidates(&segments, 30.0, 1.5).unwrap();
    assert_eq!(candidates.len(), 3);

    // Seeded at index 1: 10 + 45 < 70, so segment 2 is not absorbed.
    let hook = &candidates[1];
    assert_eq!((hook.start, hook.end, hook.duration), (10.0, 40.0, 30.0));
    let neutral = ClassifierSignal::new("NEUTRAL", 0.0);
    let score = finder.scorer().score(hook, &quiet(), &neutral, &neutral);
    assert!(score >= 6.0, "hook window scored {}", score);

    let selection = finder
        .select_best_moments(&segments, &quiet(), 30.0, 5)
        .await
        .unwrap();

    // [0,40) and [10,40) tie at 8.0; the earlier window wins, then [40,70).
    let windows: Vec<(f64, f64)> = selection.iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(windows, vec![(0.0, 40.0), (40.0, 70.0)]);
    assert_eq!(selection.len(), 2, "no padding when fewer windows fit");
}

#[tokio::test]
async fn test_empty_transcript_is_empty_selection() {
    let finder = finder_with(ClipStrategy::default());
    let selection = finder
        .select_best_moments(&[], &quiet(), 30.0, 3)
        .await
        .unwrap();
    assert!(selection.is_empty());
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let finder = finder_with(ClipStrategy::default());

    let err = finder
        .select_best_moments(&hook_transcript(), &quiet(), 0.0, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ClipError::InvalidInput(_)));

    let backwards = vec![seg(10.0, 5.0, "oops")];
    let err = finder
        .select_best_moments(&backwards, &quiet(), 30.0, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ClipError::InvalidInput(_)));
}

#[tokio::test]
async fn test_requests_are_clamped() {
    let finder = finder_with(ClipStrategy::default());
    let segments: Vec<_> = (0..40)
        .map(|i| seg(i as f64 * 20.0, i as f64 * 20.0 + 20.0, "watch this"))
        .collect();

    // 10 clips requested, 5 allowed; 3s target becomes 15s.
    let selection = finder
        .select_best_moments(&segments, &quiet(), 3.0, 10)
        .await
        .unwrap();
    assert_eq!(selection.len(), 5);
    assert!(selection.iter().all(|c| c.duration >= 15.0));

    let one = finder
        .select_best_moments(&segments, &quiet(), 30.0, 0)
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn test_each_classifier_called_once_per_candidate() {
    let sentiment = Arc::new(StubClassifier::fixed("sentiment", "POSITIVE", 0.9));
    let emotion = Arc::new(StubClassifier::fixed("emotion", "joy", 0.9));
    let finder = MomentFinder::new(ClipStrategy::default(), sentiment.clone(), emotion.clone())
        .unwrap();

    let segments = synthetic_transcript(7, 25);
    finder
        .select_best_moments(&segments, &quiet(), 30.0, 3)
        .await
        .unwrap();

    assert_eq!(sentiment.calls(), segments.len());
    assert_eq!(emotion.calls(), segments.len());
}

#[tokio::test]
async fn test_classifier_failure_aborts_by_default() {
    let sentiment = Arc::new(StubClassifier::neutral("sentiment").failing_on("secret"));
    let finder = MomentFinder::new(
        ClipStrategy::default(),
        sentiment,
        Arc::new(StubClassifier::neutral("emotion")),
    )
    .unwrap();

    let err = finder
        .select_best_moments(&hook_transcript(), &quiet(), 30.0, 3)
        .await
        .unwrap_err();
    assert!(err.is_collaborator_failure());
}

#[tokio::test]
async fn test_classifier_failure_can_drop_candidates() {
    let strategy = ClipStrategy {
        failure_policy: FailurePolicy::DropCandidate,
        ..Default::default()
    };
    let sentiment = Arc::new(StubClassifier::neutral("sentiment").failing_on("secret"));
    let finder = MomentFinder::new(
        strategy,
        sentiment,
        Arc::new(StubClassifier::neutral("emotion")),
    )
    .unwrap();

    let selection = finder
        .select_best_moments(&hook_transcript(), &quiet(), 30.0, 3)
        .await
        .unwrap();

    // Both windows containing "secret" are gone; no stand-in score.
    let windows: Vec<(f64, f64)> = selection.iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(windows, vec![(40.0, 70.0)]);
}

#[tokio::test]
async fn test_selection_invariants_on_synthetic_transcripts() {
    let finder = finder_with(ClipStrategy::default());
    let lively = AudioFeatures::new(128.0, 0.05);

    for seed in 1..=12 {
        let segments = synthetic_transcript(seed, 60);
        let selection = finder
            .select_best_moments(&segments, &lively, 30.0, 5)
            .await
            .unwrap();

        assert!(!selection.is_empty());
        assert!(selection.len() <= 5);

        let clips = selection.clips();
        for (i, a) in clips.iter().enumerate() {
            assert!((0.0..=10.0).contains(&a.score));
            assert_eq!(a.duration, a.end - a.start);
            for b in &clips[i + 1..] {
                assert!(
                    !(a.start < b.end && a.end > b.start),
                    "seed {}: {:?} overlaps {:?}",
                    seed,
                    (a.start, a.end),
                    (b.start, b.end)
                );
            }
        }
        for pair in clips.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[tokio::test]
async fn test_worker_count_does_not_change_result() {
    let segments = synthetic_transcript(42, 80);
    let serial = finder_with(ClipStrategy {
        classifier_workers: 1,
        ..Default::default()
    });
    let wide = finder_with(ClipStrategy {
        classifier_workers: 16,
        ..Default::default()
    });

    let a = serial
        .select_best_moments(&segments, &quiet(), 45.0, 5)
        .await
        .unwrap();
    let b = wide
        .select_best_moments(&segments, &quiet(), 45.0, 5)
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_select_is_idempotent() {
    let segments = synthetic_transcript(3, 40);
    let mut candidates = build_candidates(&segments, 30.0, 1.5).unwrap();
    for (i, c) in candidates.iter_mut().enumerate() {
        c.score = ((i * 7) % 11) as f64 * 0.9;
    }

    let first = select(&candidates, 5, 5);
    let second = select(&candidates, 5, 5);
    assert_eq!(first, second);
}
