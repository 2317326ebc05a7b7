use serde_json::Value;
use std::fmt;

/// Narrative generation failure with enough context to debug the upstream response.
#[derive(Debug, Clone)]
pub struct NarrativeError {
    pub stage: &'static str,
    pub detail: String,
    pub raw_response_json: Option<Value>,
}

impl NarrativeError {
    pub fn new(stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
            raw_response_json: None,
        }
    }
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "narrative generation failed ({}): {}", self.stage, self.detail)
    }
}

impl std::error::Error for NarrativeError {}
