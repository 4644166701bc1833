// ABOUTME: Chat message pipeline: validate, classify, reply, persist, and count the day's mood
// ABOUTME: The conversation is written before the mood counter; a counter failure fails the request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

use std::time::Instant;

use moodwell_core::constants::chat::MAX_MESSAGE_CHARS;
use moodwell_core::models::ConversationRecord;

use super::responder::Responder;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::sentiment::SentimentClassifier;

/// Validate a raw chat message and return the trimmed text.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty or whitespace-only message, or one longer than
/// the maximum length
pub fn validate_message(raw: &str) -> AppResult<&str> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(AppError::invalid_input("Message cannot be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::invalid_input(format!(
            "Message cannot exceed {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(message)
}

/// Process one user message end to end.
///
/// Business rules:
/// - Validation happens before any work, so rejected messages leave no rows
/// - Classification never fails; an unavailable model yields neutral at 0.5
/// - The record is stored with the classifier's label even when the reply used the
///   neutral bucket for a low-confidence label
/// - Exactly one mood increment per stored record
///
/// # Errors
///
/// Returns `InvalidInput` for a rejected message and database errors from either write
pub async fn process_message(
    database: &Database,
    classifier: &dyn SentimentClassifier,
    responder: &Responder,
    user_id: &str,
    raw_message: &str,
) -> AppResult<ConversationRecord> {
    let started = Instant::now();
    let message = validate_message(raw_message)?;

    let sentiment = classifier.classify(message).await;
    let reply = responder.respond(message, &sentiment).await;

    let record = database
        .conversations()
        .append(user_id, message, &reply, &sentiment)
        .await?;
    database.moods().record(user_id, sentiment.label).await?;

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    AppLogger::log_chat_message(
        user_id,
        sentiment.label.as_str(),
        sentiment.confidence,
        duration_ms,
    );

    Ok(record)
}
