// ABOUTME: Google Gemini provider for generated therapist replies via the Generative Language API
// ABOUTME: Maps blocked prompts, safety stops, truncation, and empty output to explicit errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Gemini Provider
//!
//! Set `GEMINI_API_KEY` with a key from Google AI Studio and optionally `GEMINI_MODEL`
//! (default `gemini-2.5-flash`).
//!
//! A completion succeeds only with non-empty text. A `MAX_TOKENS` stop that still carries
//! partial text is returned as-is.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use moodwell_core::constants::llm::DEFAULT_GEMINI_MODEL;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, MessageRole};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SERVICE_NAME: &str = "Gemini";

const FINISH_STOP: &str = "STOP";
const FINISH_SAFETY: &str = "SAFETY";
const FINISH_MAX_TOKENS: &str = "MAX_TOKENS";

const GENERATE_METHOD: &str = "generateContent";

/// Request header carrying the API key; URLs stay key-free
const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
    safety_ratings: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a provider with an API key and request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            default_model: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
        })
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point the provider at a different API root (used against local stand-ins)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn build_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    fn transport_error(context: &str, e: ReqwestError) -> AppError {
        AppError::external_service(SERVICE_NAME, format!("{context}: {}", e.without_url()))
    }

    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::System | MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }

    fn text_content(role: Option<String>, text: &str) -> GeminiContent {
        GeminiContent {
            role,
            parts: vec![ContentPart {
                text: Some(text.to_owned()),
            }],
        }
    }

    fn convert_messages(messages: &[ChatMessage]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in messages {
            if message.role == MessageRole::System {
                system_instruction = Some(Self::text_content(None, &message.content));
            } else {
                contents.push(Self::text_content(
                    Some(Self::convert_role(message.role).to_owned()),
                    &message.content,
                ));
            }
        }

        (contents, system_instruction)
    }

    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);

        let generation_config = (request.temperature.is_some() || request.max_tokens.is_some())
            .then_some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                candidate_count: 1,
            });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Turn a parsed response into reply text, or the reason there is none
    fn extract_reply(response: &GeminiResponse) -> AppResult<(String, Option<String>)> {
        let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) else {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                return Err(Self::generation_error(format!(
                    "Prompt blocked by API safety settings: {reason}"
                )));
            }
            return Err(Self::generation_error(
                "Model returned no candidates (generation failed or blocked).",
            ));
        };

        let finish_reason = candidate.finish_reason.clone();
        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();
        let text = text.trim();

        match finish_reason.as_deref() {
            Some(FINISH_SAFETY) => {
                let ratings = candidate
                    .safety_ratings
                    .as_ref()
                    .map_or_else(|| "[]".to_owned(), ToString::to_string);
                Err(Self::generation_error(format!(
                    "Response blocked due to safety settings: {ratings}"
                )))
            }
            _ if !text.is_empty() => Ok((text.to_owned(), finish_reason)),
            Some(FINISH_MAX_TOKENS) => Err(Self::generation_error(
                "Generation stopped: Maximum output tokens reached.",
            )),
            Some(reason) if reason != FINISH_STOP => Err(Self::generation_error(format!(
                "Generation stopped prematurely. Finish Reason: {reason}"
            ))),
            _ => Err(Self::generation_error(
                "No text returned from model response, even though Finish Reason was STOP.",
            )),
        }
    }

    fn generation_error(message: impl Into<String>) -> AppError {
        AppError::new(ErrorCode::ExternalServiceError, message)
    }

    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("Gemini quota exceeded: {message}"),
            ),
            _ => AppError::external_service(SERVICE_NAME, format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, GENERATE_METHOD);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::build_gemini_request(request))
            .send()
            .await
            .map_err(|e| Self::transport_error("HTTP request failed", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Self::transport_error("Failed to read response", e))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::external_service(SERVICE_NAME, format!("Failed to parse response: {e}"))
            })?;

        if let Some(error) = gemini_response.error {
            return Err(AppError::external_service(SERVICE_NAME, error.message));
        }

        let (content, finish_reason) = Self::extract_reply(&gemini_response)?;
        debug!(finish_reason = ?finish_reason, "Received Gemini reply");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/models?pageSize=1000", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Self::transport_error("Model listing failed", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Self::transport_error("Failed to read model list", e))?;
        if !status.is_success() {
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let list: ModelList = serde_json::from_str(&response_text).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Failed to parse model list: {e}"))
        })?;

        Ok(list
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_METHOD)
            })
            .map(|m| {
                m.name
                    .strip_prefix("models/")
                    .map_or_else(|| m.name.clone(), ToOwned::to_owned)
            })
            .collect())
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(raw: &str) -> AppResult<String> {
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        GeminiProvider::extract_reply(&parsed).map(|(text, _)| text)
    }

    #[test]
    fn test_stop_with_text_is_trimmed() {
        let text = reply(
            r#"{"candidates":[{"content":{"parts":[{"text":"  That sounds hard. "}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(text, "That sounds hard.");
    }

    #[test]
    fn test_blocked_prompt_reports_reason() {
        let err = reply(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert!(err.message.contains("Prompt blocked by API safety settings: SAFETY"));
    }

    #[test]
    fn test_no_candidates() {
        let err = reply(r#"{"candidates":[]}"#).unwrap_err();
        assert!(err.message.contains("no candidates"));
    }

    #[test]
    fn test_safety_stop_is_error_even_with_text() {
        let err = reply(
            r#"{"candidates":[{"content":{"parts":[{"text":"x"}]},"finishReason":"SAFETY","safetyRatings":[{"category":"HARM_CATEGORY_HARASSMENT"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("safety settings"));
        assert!(err.message.contains("HARM_CATEGORY_HARASSMENT"));
    }

    #[test]
    fn test_max_tokens_keeps_partial_text() {
        let text = reply(
            r#"{"candidates":[{"content":{"parts":[{"text":"Partial"}]},"finishReason":"MAX_TOKENS"}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Partial");

        let err = reply(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#).unwrap_err();
        assert!(err.message.contains("Maximum output tokens"));
    }

    #[test]
    fn test_other_finish_reason_and_empty_stop() {
        let err = reply(r#"{"candidates":[{"finishReason":"RECITATION"}]}"#).unwrap_err();
        assert!(err.message.contains("Finish Reason: RECITATION"));

        let err = reply(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#)
            .unwrap_err();
        assert!(err.message.contains("No text returned"));
    }

    #[test]
    fn test_request_serializes_generation_config() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_temperature(0.7)
            .with_max_tokens(400);
        let json = serde_json::to_value(GeminiProvider::build_gemini_request(&request)).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 400);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_request_url_carries_no_key() {
        let provider = GeminiProvider::new("secret-key", Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost:9/");
        let url = provider.build_url("gemini-2.5-flash", GENERATE_METHOD);
        assert_eq!(url, "http://localhost:9/models/gemini-2.5-flash:generateContent");
        assert!(!format!("{provider:?}").contains("secret-key"));
    }

    #[test]
    fn test_rate_limit_maps_to_rate_limited() {
        let err = GeminiProvider::map_api_error(429, r#"{"error":{"message":"quota"}}"#);
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
    }
}
