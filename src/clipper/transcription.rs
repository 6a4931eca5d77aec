// SYNOID Transcript Bridge
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Transcript segments come from an external speech-to-text engine. This module
// only loads, validates and re-exports them as captions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::clipper::error::ClipError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Speech-to-text collaborator. Segments must come back ordered by `start`.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn transcribe(&self, media: &Path) -> Result<Vec<TranscriptSegment>, ClipError>;
}

/// Whisper-style JSON written by an upstream transcriber.
///
/// Accepts either a bare array of segments or an object with a `segments`
/// array. Without an explicit path the sidecar `<media>.json` is used.
pub struct JsonTranscript {
    path: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Bare(Vec<TranscriptSegment>),
    Wrapped { segments: Vec<TranscriptSegment> },
}

impl JsonTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn sidecar() -> Self {
        Self { path: None }
    }

    pub fn parse(content: &str) -> Result<Vec<TranscriptSegment>, ClipError> {
        let file: TranscriptFile = serde_json::from_str(content)
            .map_err(|e| ClipError::Transcription(format!("unreadable transcript: {}", e)))?;
        let segments = match file {
            TranscriptFile::Bare(segments) => segments,
            TranscriptFile::Wrapped { segments } => segments,
        };

        Ok(segments
            .into_iter()
            .map(|mut seg| {
                seg.text = seg.text.trim().to_string();
                seg
            })
            .collect())
    }
}

#[async_trait]
impl TranscriptSource for JsonTranscript {
    async fn transcribe(&self, media: &Path) -> Result<Vec<TranscriptSegment>, ClipError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| media.with_extension("json"));

        info!("[TRANSCRIPT] Loading segments from {:?}", path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ClipError::Transcription(format!("{:?}: {}", path, e)))?;

        let segments = Self::parse(&content)?;
        info!("[TRANSCRIPT] Loaded {} segments", segments.len());
        Ok(segments)
    }
}

/// Check the ordering and span invariants the window builder relies on.
pub fn validate_segments(segments: &[TranscriptSegment]) -> Result<(), ClipError> {
    let mut previous_start = f64::NEG_INFINITY;

    for (i, seg) in segments.iter().enumerate() {
        if !seg.start.is_finite() || !seg.end.is_finite() {
            return Err(ClipError::InvalidInput(format!(
                "segment {} has a non-finite timestamp",
                i
            )));
        }
        if seg.duration() <= 0.0 {
            return Err(ClipError::InvalidInput(format!(
                "segment {} ends at {:.3}s, not after its start {:.3}s",
                i, seg.end, seg.start
            )));
        }
        if seg.start < previous_start {
            return Err(ClipError::InvalidInput(format!(
                "segment {} starts at {:.3}s, before the previous segment",
                i, seg.start
            )));
        }
        previous_start = seg.start;
    }

    Ok(())
}

/// Segments touching `[start, end)`, trimmed to the window.
pub fn segments_in_window(
    segments: &[TranscriptSegment],
    start: f64,
    end: f64,
) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .filter(|s| s.start < end && s.end > start)
        .map(|s| TranscriptSegment {
            start: s.start.max(start),
            end: s.end.min(end),
            text: s.text.clone(),
        })
        .collect()
}

/// SRT captions for a clip cut at `clip_start`, cue times relative to the cut.
pub fn generate_srt(segments: &[TranscriptSegment], clip_start: f64) -> String {
    render_srt(segments, clip_start, |text| text.trim().to_string())
}

/// Same as [`generate_srt`], with cue text passed through [`add_emojis`].
pub fn generate_emoji_srt(segments: &[TranscriptSegment], clip_start: f64) -> String {
    render_srt(segments, clip_start, |text| add_emojis(text.trim()))
}

fn render_srt(
    segments: &[TranscriptSegment],
    clip_start: f64,
    caption: impl Fn(&str) -> String,
) -> String {
    let mut srt_out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        let start = format_srt_time(seg.start - clip_start);
        let end = format_srt_time(seg.end - clip_start);
        srt_out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            start,
            end,
            caption(&seg.text)
        ));
    }
    srt_out
}

const CAPTION_EMOJIS: &[(&str, &str)] = &[
    ("money", "💰"),
    ("rich", "💰"),
    ("dollar", "💵"),
    ("love", "❤️"),
    ("heart", "❤️"),
    ("like", "👍"),
    ("fire", "🔥"),
    ("hot", "🔥"),
    ("amazing", "🔥"),
    ("laugh", "😂"),
    ("funny", "😂"),
    ("lol", "😂"),
    ("wow", "😱"),
    ("omg", "😱"),
    ("shocking", "😱"),
    ("cool", "😎"),
    ("awesome", "😎"),
    ("great", "😎"),
    ("think", "🤔"),
    ("question", "❓"),
    ("why", "🤔"),
    ("warning", "⚠️"),
    ("careful", "⚠️"),
    ("danger", "⚠️"),
    ("success", "✅"),
    ("win", "🏆"),
    ("winner", "🏆"),
    ("music", "🎵"),
    ("song", "🎵"),
    ("sound", "🔊"),
];

/// Append an emoji after every word in the caption table.
///
/// Words are matched whole, ignoring case and punctuation, so "Money!"
/// matches but "moneyball" does not. Whitespace is normalized to single spaces.
pub fn add_emojis(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let bare: String = word
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .flat_map(char::to_lowercase)
                .collect();
            match CAPTION_EMOJIS.iter().find(|(key, _)| *key == bare) {
                Some((_, emoji)) => format!("{} {}", word, emoji),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_srt_time(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let mins = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_and_wrapped() {
        let bare = r#"[{"start": 0.0, "end": 2.5, "text": "  hello  "}]"#;
        let segments = JsonTranscript::parse(bare).unwrap();
        assert_eq!(segments, vec![TranscriptSegment::new(0.0, 2.5, "hello")]);

        let wrapped = r#"{"text": "ignored", "segments": [
            {"start": 0.0, "end": 1.0, "text": "a", "words": []},
            {"start": 1.0, "end": 2.0, "text": "b"}
        ]}"#;
        let segments = JsonTranscript::parse(wrapped).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "b");
    }

    #[test]
    fn test_add_emojis_whole_words_only() {
        assert_eq!(add_emojis("Money talks, WOW!"), "Money 💰 talks, WOW! 😱");
        assert_eq!(add_emojis("moneyball is fine"), "moneyball is fine");
        assert_eq!(add_emojis("no matches here"), "no matches here");
    }

    #[test]
    fn test_emoji_srt_decorates_cue_text() {
        let segments = vec![TranscriptSegment::new(12.0, 14.5, " we win ")];
        let srt = generate_emoji_srt(&segments, 10.0);
        assert_eq!(srt, "1\n00:00:02,000 --> 00:00:04,500\nwe win 🏆\n\n");
        assert!(!generate_srt(&segments, 10.0).contains('🏆'));
    }

    #[test]
    fn test_parse_garbage_is_transcription_failure() {
        let err = JsonTranscript::parse("not json").unwrap_err();
        assert!(matches!(err, ClipError::Transcription(_)));
    }

    #[test]
    fn test_validate_segments() {
        let ok = vec![
            TranscriptSegment::new(0.0, 1.0, "a"),
            TranscriptSegment::new(0.0, 2.0, "b"),
            TranscriptSegment::new(1.5, 3.0, "c"),
        ];
        assert!(validate_segments(&ok).is_ok());
        assert!(validate_segments(&[]).is_ok());

        let zero_length = vec![TranscriptSegment::new(1.0, 1.0, "a")];
        assert!(matches!(
            validate_segments(&zero_length),
            Err(ClipError::InvalidInput(_))
        ));

        let out_of_order = vec![
            TranscriptSegment::new(5.0, 6.0, "a"),
            TranscriptSegment::new(1.0, 2.0, "b"),
        ];
        assert!(validate_segments(&out_of_order).is_err());

        let nan = vec![TranscriptSegment::new(f64::NAN, 2.0, "a")];
        assert!(validate_segments(&nan).is_err());
    }

    #[test]
    fn test_srt_is_rebased_to_clip_start() {
        let segments = vec![
            TranscriptSegment::new(60.0, 62.5, "first line"),
            TranscriptSegment::new(62.5, 3725.25, "second line "),
        ];
        let srt = generate_srt(&segments, 60.0);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,500\nfirst line\n\n\
             2\n00:00:02,500 --> 01:01:05,250\nsecond line\n\n"
        );
    }

    #[test]
    fn test_segments_in_window_trims_edges() {
        let segments = vec![
            TranscriptSegment::new(0.0, 10.0, "a"),
            TranscriptSegment::new(10.0, 20.0, "b"),
            TranscriptSegment::new(20.0, 30.0, "c"),
        ];
        let window = segments_in_window(&segments, 5.0, 20.0);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].start, 5.0);
        assert_eq!(window[1].end, 20.0);
    }
}
