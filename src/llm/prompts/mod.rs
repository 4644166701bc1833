// ABOUTME: Prompt text for generated therapist replies and the user-facing failure message
// ABOUTME: The prompt template is loaded at compile time from a markdown file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Prompts
//!
//! The therapist prompt lives in `therapist.md` so it can be edited without touching code.
//! The fallback helpers build the reply shown when generation fails, which tells the user
//! they are heard and carries the technical cause plus a model-selection hint.

use moodwell_core::constants::llm::{DEFAULT_GEMINI_MODEL, STABLE_MODELS};

/// Therapist prompt template; `{message}` is replaced with the user's text
pub const THERAPIST_PROMPT_TEMPLATE: &str = include_str!("therapist.md");

const FALLBACK_PREFIX: &str = "I'm here with you. I'm having a technical issue responding fully right now, but you're not alone. You can share more if you'd like.";

/// Number of catalog models suggested when none of the stable ones are listed
const MAX_SUGGESTED_MODELS: usize = 4;

/// Build the generation prompt for one user message
#[must_use]
pub fn therapist_prompt(message: &str) -> String {
    THERAPIST_PROMPT_TEMPLATE.replace("{message}", message)
}

/// Reply returned in place of a generated one
#[must_use]
pub fn fallback_reply(error: &str, hint: &str) -> String {
    format!("{FALLBACK_PREFIX}\n\nTechnical note: {error}\n{hint}")
}

/// Hint text derived from the provider's model catalog.
///
/// `None` means the catalog could not be fetched. An empty catalog yields no hint.
#[must_use]
pub fn model_hint(catalog: Option<&[String]>) -> String {
    let Some(models) = catalog else {
        return format!(
            "If you see a 'model not found' error, ensure you are using a supported model name (e.g., '{DEFAULT_GEMINI_MODEL}')."
        );
    };

    let stable: Vec<&str> = STABLE_MODELS
        .iter()
        .copied()
        .filter(|stable| models.iter().any(|m| m == stable))
        .collect();
    let suggested: Vec<&str> = if stable.is_empty() {
        models
            .iter()
            .take(MAX_SUGGESTED_MODELS)
            .map(String::as_str)
            .collect()
    } else {
        stable
    };

    if suggested.is_empty() {
        return String::new();
    }
    format!(
        "Available stable models: {}. Set the environment variable `GEMINI_MODEL` to a supported model name.",
        suggested.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_message() {
        let prompt = therapist_prompt("I can't sleep");
        assert!(prompt.contains("User message: I can't sleep"));
        assert!(prompt.starts_with("You are a compassionate, supportive AI therapist."));
        assert!(!prompt.contains("{message}"));
    }

    #[test]
    fn test_hint_prefers_stable_models() {
        let catalog = vec![
            "gemini-2.5-pro".to_owned(),
            "gemini-exp-1206".to_owned(),
            "gemini-2.5-flash".to_owned(),
        ];
        let hint = model_hint(Some(&catalog));
        assert!(hint.starts_with("Available stable models: gemini-2.5-flash, gemini-2.5-pro."));
        assert!(!hint.contains("gemini-exp-1206"));
    }

    #[test]
    fn test_hint_uses_first_catalog_models_without_stable_ones() {
        let catalog: Vec<String> = (1..=6).map(|i| format!("model-{i}")).collect();
        let hint = model_hint(Some(&catalog));
        assert!(hint.contains("model-1, model-2, model-3, model-4."));
        assert!(!hint.contains("model-5"));
    }

    #[test]
    fn test_hint_when_catalog_unavailable() {
        assert!(model_hint(None).contains("'model not found'"));
        assert!(model_hint(Some(&[])).is_empty());
    }

    #[test]
    fn test_fallback_reply_layout() {
        let reply = fallback_reply("HTTP 404", "hint");
        assert!(reply.starts_with("I'm here with you."));
        assert!(reply.ends_with("\n\nTechnical note: HTTP 404\nhint"));
    }
}
