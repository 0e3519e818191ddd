//! Chat-completion client for report text.

use super::prompt::ReportPrompt;
use crate::config::ReportConfig;
use crate::retry::{check_status, retry_with_backoff, ApiError};
use serde_json::{json, Value};
use std::time::Duration;

pub struct ChatClient {
    http: reqwest::blocking::Client,
    config: ReportConfig,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: &ReportConfig, api_key: String) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            api_key,
        })
    }

    /// Sends the prompt, retrying per the configured policy, and returns the reply text.
    pub fn complete(&self, prompt: &ReportPrompt) -> Result<String, ApiError> {
        let body = request_body(&self.config, prompt).to_string();
        retry_with_backoff(&self.config.retry_policy(), "Report request", |_| {
            self.complete_once(&body)
        })
    }

    fn complete_once(&self, body: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()?;

        let status = response.status().as_u16();
        let text = check_status(status, response.text()?)?;
        extract_content(&text)
    }
}

fn request_body(config: &ReportConfig, prompt: &ReportPrompt) -> Value {
    json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": prompt.system },
            { "role": "user", "content": prompt.user },
        ],
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    })
}

/// Pulls `choices[0].message.content` out of a completion response.
pub fn extract_content(body: &str) -> Result<String, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(format!("invalid JSON: {}", e)))?;

    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Malformed(truncate(body, 500)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
