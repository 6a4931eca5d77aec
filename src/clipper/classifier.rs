// SYNOID Text Classifier Bridge
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Sentiment and emotion labels for a candidate's combined text. The models
// themselves live behind an OpenAI-compatible endpoint (Ollama by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, error};

use crate::clipper::error::ClipError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSignal {
    pub label: String,
    pub confidence: f64,
}

impl ClassifierSignal {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Sentiment,
    Emotion,
}

impl ClassifierKind {
    pub fn id(&self) -> &'static str {
        match self {
            ClassifierKind::Sentiment => "sentiment",
            ClassifierKind::Emotion => "emotion",
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self {
            ClassifierKind::Sentiment => &["POSITIVE", "NEGATIVE", "NEUTRAL"],
            ClassifierKind::Emotion => &[
                "anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise",
                "excitement",
            ],
        }
    }

    fn normalize_label(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            ClassifierKind::Sentiment => trimmed.to_uppercase(),
            ClassifierKind::Emotion => trimmed.to_lowercase(),
        }
    }
}

/// Labels a piece of text. Called once per candidate per signal type.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierSignal, ClipError>;

    /// Short identifier used in logs and error messages.
    fn classifier_id(&self) -> &str;
}

/// Deterministic classifier for tests and offline runs.
///
/// Returns the first rule whose needle occurs in the lower-cased text, or the
/// fallback signal. Every call is counted.
pub struct StubClassifier {
    id: String,
    rules: Vec<(String, ClassifierSignal)>,
    fallback: ClassifierSignal,
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn fixed(id: &str, label: &str, confidence: f64) -> Self {
        Self {
            id: id.to_string(),
            rules: Vec::new(),
            fallback: ClassifierSignal::new(label, confidence),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Neutral signal that never crosses a scoring threshold.
    pub fn neutral(id: &str) -> Self {
        Self::fixed(id, "NEUTRAL", 0.0)
    }

    pub fn with_rule(mut self, needle: &str, label: &str, confidence: f64) -> Self {
        self.rules.push((
            needle.to_lowercase(),
            ClassifierSignal::new(label, confidence),
        ));
        self
    }

    /// Fail any text containing `needle`, to exercise collaborator failures.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_lowercase());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierSignal, ClipError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();

        if let Some(needle) = &self.fail_on {
            if lower.contains(needle.as_str()) {
                return Err(ClipError::classifier(&self.id, "stub failure"));
            }
        }

        Ok(self
            .rules
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))
            .map(|(_, signal)| signal.clone())
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn classifier_id(&self) -> &str {
        &self.id
    }
}

/// Model-backed classifier speaking the OpenAI chat-completions protocol.
pub struct ChatClassifier {
    client: reqwest::Client,
    api_url: String,
    model: String,
    kind: ClassifierKind,
}

impl ChatClassifier {
    pub fn new(
        api_url: &str,
        model: &str,
        kind: ClassifierKind,
        timeout: Duration,
    ) -> Result<Self, ClipError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClipError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            model: model.to_string(),
            kind,
        })
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            "Classify the {} of the following transcript excerpt. \
             Allowed labels: {}. \
             Reply with JSON only, shaped as {{\"label\": \"<label>\", \"confidence\": <0..1>}}.\n\n\"{}\"",
            self.kind.id(),
            self.kind.labels().join(", "),
            text
        )
    }
}

#[async_trait]
impl TextClassifier for ChatClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierSignal, ClipError> {
        debug!("[CLASSIFIER] {} via {} ({} chars)", self.kind.id(), self.model, text.len());

        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a text classifier. Respond with a single JSON object and nothing else."
                },
                {
                    "role": "user",
                    "content": self.prompt(text)
                }
            ],
            "temperature": 0.0
        });

        let endpoint = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));

        let resp = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("[CLASSIFIER] {} request failed: {}", self.kind.id(), e);
                if e.is_timeout() {
                    ClipError::Timeout(format!("{} classifier: {}", self.kind.id(), e))
                } else {
                    ClipError::classifier(self.kind.id(), e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(ClipError::classifier(
                self.kind.id(),
                format!("API Error: {}", resp.status()),
            ));
        }

        let body: serde_json::Value = resp.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ClipError::classifier(self.kind.id(), "empty completion"))?;

        parse_signal(content, self.kind)
    }

    fn classifier_id(&self) -> &str {
        self.kind.id()
    }
}

/// Parse a `{"label", "confidence"}` reply, tolerating markdown code fences.
pub fn parse_signal(content: &str, kind: ClassifierKind) -> Result<ClassifierSignal, ClipError> {
    #[derive(Deserialize)]
    struct Reply {
        label: String,
        confidence: f64,
    }

    let start = content.find('{');
    let end = content.rfind('}');
    let body = match (start, end) {
        (Some(s), Some(e)) if e > s => &content[s..=e],
        _ => {
            return Err(ClipError::classifier(
                kind.id(),
                format!("no JSON object in reply: {:?}", content),
            ))
        }
    };

    let reply: Reply = serde_json::from_str(body)
        .map_err(|e| ClipError::classifier(kind.id(), format!("malformed reply: {}", e)))?;

    if !reply.confidence.is_finite() {
        return Err(ClipError::classifier(kind.id(), "non-finite confidence"));
    }

    Ok(ClassifierSignal::new(
        &kind.normalize_label(&reply.label),
        reply.confidence,
    ))
}
