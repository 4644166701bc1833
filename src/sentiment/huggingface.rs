// ABOUTME: Hosted inference backend for sentiment classification over HTTP
// ABOUTME: Posts the message, picks the highest-scoring label, and maps it to positive/negative/neutral
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use moodwell_core::models::{SentimentLabel, SentimentResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::SentimentClassifier;
use crate::errors::{AppError, AppResult};

const SERVICE_NAME: &str = "Sentiment model";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Text-classification endpoints return either `[[{label, score}, ...]]` or a flat list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

/// Sentiment classifier backed by a hosted text-classification model
pub struct HuggingFaceClassifier {
    client: Client,
    api_url: String,
    api_token: Option<String>,
}

impl HuggingFaceClassifier {
    /// Create a classifier for `api_url` with an optional bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        api_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_token,
        })
    }

    /// Reduce a model response to one result
    fn interpret(response: InferenceResponse) -> AppResult<SentimentResult> {
        let scores = match response {
            InferenceResponse::Nested(groups) => groups.into_iter().flatten().collect(),
            InferenceResponse::Flat(scores) => scores,
            InferenceResponse::Error { error } => {
                return Err(AppError::external_service(SERVICE_NAME, error));
            }
        };

        let best = scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "empty prediction list"))?;

        Ok(SentimentResult::new(
            SentimentLabel::from_model_label(&best.label),
            best.score,
        ))
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn try_classify(&self, text: &str) -> AppResult<SentimentResult> {
        let mut request = self
            .client
            .post(&self.api_url)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("read failed: {e}")))?;

        if !status.is_success() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("status {status}: {body}"),
            ));
        }

        let parsed: InferenceResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("unexpected response: {e}"))
        })?;
        let result = Self::interpret(parsed)?;

        debug!(
            sentiment = %result.label,
            confidence = result.confidence,
            "Classified message"
        );
        Ok(result)
    }
}

impl Debug for HuggingFaceClassifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HuggingFaceClassifier")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
