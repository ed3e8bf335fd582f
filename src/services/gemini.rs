// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client for plan generation.
//!
//! Handles:
//! - `generateContent` calls with a fixed JSON-output sampling config
//! - Extraction of the first candidate's text
//! - Rate limit detection (429)
//!
//! Handlers depend on the [`PlanGenerator`] trait, not on this client, so
//! tests can substitute canned responses.

use crate::error::AppError;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text generation backend used by the plan endpoint.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Send `prompt` to the model and return its raw text, which is
    /// expected (not guaranteed) to be JSON.
    async fn generate_json(&self, prompt: &str) -> Result<String, AppError>;
}

/// Sampling settings for plan generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub response_mime_type: &'static str,
}

/// Low temperature keeps plans consistent; JSON MIME type asks for bare JSON.
pub const PLAN_SAMPLING: SamplingConfig = SamplingConfig {
    temperature: 0.4,
    top_p: 0.9,
    response_mime_type: "application/json",
};

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model` authenticated with `api_key`.
    ///
    /// Only connecting is time-limited; generation itself can take long.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed building Gemini HTTP client")?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Point the client at another endpoint (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            urlencoding::encode(&self.model),
            urlencoding::encode(&self.api_key)
        )
    }

    fn build_request(prompt: &str, sampling: &SamplingConfig) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                response_mime_type: sampling.response_mime_type.to_string(),
            },
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: &GenerateContentResponse) -> Result<String, AppError> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(AppError::AiProvider(format!("Prompt blocked: {}", reason)));
        }

        let candidate = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| AppError::AiProvider("No candidates in Gemini response".to_string()))?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(AppError::AiProvider(format!(
                "Empty Gemini response (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }

    /// Map a non-success HTTP status to an error.
    fn map_api_error(status: u16, body: &str) -> AppError {
        let message = serde_json::from_str::<ApiErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        if status == 429 {
            tracing::warn!("Gemini rate limit hit (429)");
            return AppError::AiProvider(format!("{}: {}", AppError::AI_RATE_LIMIT, message));
        }

        AppError::AiProvider(format!("HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> Result<String, AppError> {
        let request = Self::build_request(prompt, &PLAN_SAMPLING);

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .http
            .post(self.build_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AiProvider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::AiProvider(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_api_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::AiProvider(format!("JSON parse error: {}", e)))?;

        let text = Self::extract_text(&parsed)?;
        tracing::debug!(model = %self.model, response_len = text.len(), "Gemini responded");
        Ok(text)
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
