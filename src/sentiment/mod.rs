// ABOUTME: Sentiment classifier abstraction returning a label and confidence for one message
// ABOUTME: Backends implement a fallible call; the provided classify() degrades to neutral on any failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Sentiment Classification
//!
//! [`SentimentClassifier::classify`] never fails. Backends report problems through
//! [`SentimentClassifier::try_classify`], and the provided method logs them and returns
//! [`SentimentResult::fallback`] (neutral, 0.5).

mod huggingface;

pub use huggingface::HuggingFaceClassifier;

use async_trait::async_trait;
use moodwell_core::models::SentimentResult;
use tracing::error;

use crate::errors::{AppError, AppResult, ErrorCode};

/// Classifier contract used by the chat pipeline
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Short backend identifier for logs
    fn name(&self) -> &'static str;

    /// Classify `text`, reporting backend failures
    async fn try_classify(&self, text: &str) -> AppResult<SentimentResult>;

    /// Classify `text`, falling back to neutral with confidence 0.5 on any failure
    async fn classify(&self, text: &str) -> SentimentResult {
        match self.try_classify(text).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    classifier = self.name(),
                    error = %e,
                    "Sentiment classification failed, using neutral fallback"
                );
                SentimentResult::fallback()
            }
        }
    }
}

/// Classifier used when no sentiment endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

#[async_trait]
impl SentimentClassifier for UnavailableClassifier {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn try_classify(&self, _text: &str) -> AppResult<SentimentResult> {
        Err(AppError::new(
            ErrorCode::ExternalServiceUnavailable,
            "No sentiment model is configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodwell_core::models::SentimentLabel;

    struct FixedClassifier(SentimentResult);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn try_classify(&self, _text: &str) -> AppResult<SentimentResult> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_unavailable_classifier_falls_back_to_neutral() {
        let result = UnavailableClassifier.classify("I feel great").await;
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_successful_backend_result_passes_through() {
        let expected = SentimentResult::new(SentimentLabel::Positive, 0.93);
        let result = FixedClassifier(expected).classify("hello").await;
        assert_eq!(result, expected);
    }
}
