// ABOUTME: Reply selection for chat messages: canned templates or a text generation model
// ABOUTME: Model failures become a supportive fallback reply carrying the error and a model hint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::sync::Arc;

use moodwell_core::constants::llm::{MAX_OUTPUT_TOKENS, TEMPERATURE};
use moodwell_core::models::SentimentResult;
use moodwell_intelligence::ResponseGenerator;
use tracing::{error, warn};

use crate::llm::prompts::{fallback_reply, model_hint, therapist_prompt};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

/// How replies are produced
#[derive(Clone)]
pub enum Responder {
    /// Randomised templates with keyword suggestions
    Templates(ResponseGenerator),
    /// Generated by a text generation provider
    Llm(Arc<dyn LlmProvider>),
}

impl Responder {
    /// Short identifier for logs
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Templates(_) => "templates",
            Self::Llm(_) => "llm",
        }
    }

    /// Reply to `message`. Never fails.
    pub async fn respond(&self, message: &str, sentiment: &SentimentResult) -> String {
        match self {
            Self::Templates(generator) => {
                generator.generate(message, sentiment, &mut rand::thread_rng())
            }
            Self::Llm(provider) => Self::generate(provider.as_ref(), message).await,
        }
    }

    async fn generate(provider: &dyn LlmProvider, message: &str) -> String {
        let request = ChatRequest::new(vec![ChatMessage::user(therapist_prompt(message))])
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_OUTPUT_TOKENS);

        match provider.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                error!(provider = provider.name(), error = %e, "Reply generation failed");
                let catalog = match provider.list_models().await {
                    Ok(models) => Some(models),
                    Err(list_err) => {
                        warn!(error = %list_err, "Could not list models for hint");
                        None
                    }
                };
                fallback_reply(&e.message, &model_hint(catalog.as_deref()))
            }
        }
    }
}
