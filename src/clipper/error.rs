// SYNOID Clipper Errors
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::fmt;

/// Failure modes of a clip selection run.
///
/// An empty selection is not represented here: callers check
/// `SelectionResult::is_empty()` instead of matching on an error.
#[derive(Debug)]
pub enum ClipError {
    /// Malformed transcript segments or a non-positive target duration.
    /// Surfaced immediately, never retried.
    InvalidInput(String),

    /// Strategy file or scoring rules that cannot be used (bad regex,
    /// inverted clamp range, zero worker pool).
    Config(String),

    /// The sentiment or emotion classifier failed for one candidate.
    Classifier { classifier: String, message: String },

    /// Audio feature extraction failed for the whole video.
    FeatureExtraction(String),

    /// The transcription collaborator could not produce segments.
    Transcription(String),

    /// A collaborator call exceeded its deadline.
    Timeout(String),

    Io(String),

    Parse(String),

    /// A scoring or window-building task panicked or was cancelled.
    Internal(String),
}

impl ClipError {
    pub fn classifier(classifier: &str, message: impl Into<String>) -> Self {
        ClipError::Classifier {
            classifier: classifier.to_string(),
            message: message.into(),
        }
    }

    /// True for failures raised by an external collaborator (classifier,
    /// feature extractor, transcriber) rather than by the core itself.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            ClipError::Classifier { .. }
                | ClipError::FeatureExtraction(_)
                | ClipError::Transcription(_)
                | ClipError::Timeout(_)
        )
    }
}

impl fmt::Display for ClipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ClipError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            ClipError::Classifier {
                classifier,
                message,
            } => write!(f, "Classifier '{}' failed: {}", classifier, message),
            ClipError::FeatureExtraction(msg) => {
                write!(f, "Audio feature extraction failed: {}", msg)
            }
            ClipError::Transcription(msg) => write!(f, "Transcription failed: {}", msg),
            ClipError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ClipError::Io(msg) => write!(f, "I/O error: {}", msg),
            ClipError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClipError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ClipError {}

impl From<tokio::task::JoinError> for ClipError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClipError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ClipError {
    fn from(err: std::io::Error) -> Self {
        ClipError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClipError {
    fn from(err: serde_json::Error) -> Self {
        ClipError::Parse(err.to_string())
    }
}

impl From<regex::Error> for ClipError {
    fn from(err: regex::Error) -> Self {
        ClipError::Config(format!("bad hook pattern: {}", err))
    }
}

impl From<hound::Error> for ClipError {
    fn from(err: hound::Error) -> Self {
        ClipError::FeatureExtraction(err.to_string())
    }
}

impl From<reqwest::Error> for ClipError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClipError::Timeout(err.to_string())
        } else {
            ClipError::classifier("http", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_classification() {
        assert!(ClipError::classifier("sentiment", "boom").is_collaborator_failure());
        assert!(ClipError::Timeout("slow".into()).is_collaborator_failure());
        assert!(!ClipError::InvalidInput("bad".into()).is_collaborator_failure());
        assert!(!ClipError::Config("bad".into()).is_collaborator_failure());
        assert!(!ClipError::Internal("task panicked".into()).is_collaborator_failure());
    }

    #[test]
    fn test_display_names_classifier() {
        let err = ClipError::classifier("emotion", "model offline");
        assert_eq!(err.to_string(), "Classifier 'emotion' failed: model offline");
    }
}
