use crate::config::Settings;
use crate::narrative::error::NarrativeError;
use crate::narrative::NarrativeClient;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(api_key, base_url, model, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn response_text(res: &GenerateContentResponse) -> Option<String> {
        let parts = &res.candidates.first()?.content.as_ref()?.parts;
        let text: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            return None;
        }
        Some(text.join("\n"))
    }
}

#[async_trait::async_trait]
impl NarrativeClient for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| NarrativeError::new("config", format!("invalid API key header: {e}")))?;
        headers.insert("x-goog-api-key", key);

        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(|e| NarrativeError::new("transport", e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| NarrativeError::new("transport", e.to_string()))?;
        let raw_json = serde_json::from_str::<serde_json::Value>(&text).ok();

        if !status.is_success() {
            let detail = raw_json
                .as_ref()
                .and_then(|v| v.pointer("/error/message"))
                .and_then(|v| v.as_str())
                .map(|m| format!("status={status}: {m}"))
                .unwrap_or_else(|| format!("status={status}"));
            return Err(NarrativeError {
                stage: "http",
                detail,
                raw_response_json: raw_json,
            });
        }

        let Some(raw_json) = raw_json else {
            return Err(NarrativeError::new("decode", "response is not valid JSON"));
        };
        let parsed = serde_json::from_value::<GenerateContentResponse>(raw_json.clone())
            .map_err(|e| NarrativeError {
                stage: "decode",
                detail: e.to_string(),
                raw_response_json: Some(raw_json.clone()),
            })?;

        match Self::response_text(&parsed) {
            Some(text) => Ok(text),
            None => {
                tracing::warn!(model = %self.model, "narrative response carried no candidate text");
                Err(NarrativeError {
                    stage: "shape",
                    detail: "response has no candidates[0].content.parts[].text".to_string(),
                    raw_response_json: Some(raw_json),
                })
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
