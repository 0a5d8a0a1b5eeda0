use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::error::ClassifyError;

/// Placeholder written into the combined text for a missing side.
pub const ABSENT_SIDE: &str = "None";

/// Instruction sent with every review. The taxonomy is fixed so labels
/// stay groupable downstream.
pub const SENTIMENT_INSTRUCTION: &str = "tell me which sentiment fits this review best: anger, disgust, fear, joy, neutral, sadness, surprise GIVE ME ONLY THE SENTIMENT. NO OTHER WORDS.";

const CHAT_PREAMBLE: &str =
    "You are a helpful assistant. Analyze the following content and answer the query about it.";
const MAX_TOKENS: u32 = 1000;

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, content: &str, instruction: &str) -> Result<String, ClassifyError>;
}

pub fn build_classifier(cfg: &ClassifierConfig) -> Box<dyn Classifier> {
    match cfg {
        ClassifierConfig::Llm {
            base_url,
            model,
            api_key,
        } => Box::new(LlmClassifier::new(base_url, model, api_key)),
        ClassifierConfig::Local { url } => Box::new(LocalClassifier::new(url)),
    }
}

/// Deterministic merge of both review sides, absent sides rendered as
/// "None". Returns None only when both sides are absent.
pub fn combined_text(positive: Option<&str>, negative: Option<&str>) -> Option<String> {
    if positive.is_none() && negative.is_none() {
        return None;
    }
    Some(format!(
        "Positive: {} negative: {}",
        positive.unwrap_or(ABSENT_SIDE),
        negative.unwrap_or(ABSENT_SIDE)
    ))
}

/// Combined text plus its label. A review with no text on either side is
/// never sent to the classifier; a classifier failure downgrades to an
/// absent label and the row survives.
pub async fn label_review(
    classifier: &dyn Classifier,
    positive: Option<&str>,
    negative: Option<&str>,
) -> (Option<String>, Option<String>) {
    let content = match combined_text(positive, negative) {
        Some(c) => c,
        None => return (None, None),
    };
    match classifier.classify(&content, SENTIMENT_INSTRUCTION).await {
        Ok(label) => (Some(content), Some(label)),
        Err(e) => {
            warn!("sentiment classification failed: {}", e);
            (Some(content), None)
        }
    }
}

/// OpenAI-compatible chat completions backend.
pub struct LlmClassifier {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClassifier {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, content: &str, instruction: &str) -> Result<String, ClassifyError> {
        let prompt = format!(
            "{}\n\nContent:\n{}\n\nQuery:\n{}",
            CHAT_PREAMBLE, content, instruction
        );
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: Value = response.json().await?;
        label_from_chat(&parsed)
            .map(str::to_string)
            .ok_or(ClassifyError::MissingLabel)
    }
}

/// Local text-classification endpoint (HF inference style). The model's
/// taxonomy is baked in, so the instruction is not sent.
pub struct LocalClassifier {
    client: reqwest::Client,
    url: String,
}

impl LocalClassifier {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    async fn classify(&self, content: &str, _instruction: &str) -> Result<String, ClassifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "inputs": content }))
            .send()
            .await?
            .error_for_status()?;
        let parsed: Value = response.json().await?;
        label_from_ranked(&parsed)
            .map(str::to_string)
            .ok_or(ClassifyError::MissingLabel)
    }
}

fn label_from_chat(parsed: &Value) -> Option<&str> {
    parsed
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Ranked responses come as [[{label, score}, ...]] with the top label
/// first; some servers skip the outer array.
fn label_from_ranked(parsed: &Value) -> Option<&str> {
    let first = match parsed.get(0) {
        Some(Value::Array(inner)) => inner.first(),
        other => other,
    };
    first
        .and_then(|o| o.get("label"))
        .and_then(|l| l.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}


// ── Tests ──
