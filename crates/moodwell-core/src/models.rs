// ABOUTME: Shared domain models for sentiment, conversation records, and daily mood counters
// ABOUTME: Defines SentimentLabel, MoodCounts with dominant-mood derivation, and persisted record types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Data Models
//!
//! Types shared between the storage layer, the pure intelligence crate, and the HTTP
//! surface. Counters are kept as `i64` to match SQLite's `INTEGER` affinity.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::sentiment::FALLBACK_CONFIDENCE;
use crate::errors::AppError;

/// Sentiment label attached to every processed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Positive sentiment
    Positive,
    /// Negative sentiment
    Negative,
    /// Neutral or unknown sentiment
    Neutral,
}

impl SentimentLabel {
    /// All labels in tie-break preference order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Lowercase wire and storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Map a raw classifier label (`POSITIVE`, `negative`, `LABEL_1`, ...) to a sentiment.
    ///
    /// Anything that is not recognisably positive or negative is neutral.
    #[must_use]
    pub fn from_model_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Self::Positive,
            "negative" | "neg" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(AppError::invalid_input(format!(
                "Unknown sentiment label: {other}"
            ))),
        }
    }
}

/// Result of classifying one message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Classified label
    pub label: SentimentLabel,
    /// Confidence in `[0.0, 1.0]`
    pub confidence: f64,
}

impl SentimentResult {
    /// Create a result, clamping confidence into `[0.0, 1.0]`
    #[must_use]
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            FALLBACK_CONFIDENCE
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    /// Safe default returned whenever the classifier cannot produce an answer
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// Positive / negative / neutral tallies with their total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCounts {
    /// Positive messages
    pub positive: i64,
    /// Negative messages
    pub negative: i64,
    /// Neutral messages
    pub neutral: i64,
    /// All messages
    pub total: i64,
}

impl MoodCounts {
    /// Build counts from the three label tallies; `total` is derived
    #[must_use]
    pub const fn new(positive: i64, negative: i64, neutral: i64) -> Self {
        Self {
            positive,
            negative,
            neutral,
            total: positive + negative + neutral,
        }
    }

    /// Count for a single label
    #[must_use]
    pub const fn get(&self, label: SentimentLabel) -> i64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Record one more message with the given label
    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }

    /// Label with the highest count, ties broken positive > negative > neutral
    #[must_use]
    pub fn dominant(&self) -> SentimentLabel {
        if self.positive >= self.negative && self.positive >= self.neutral {
            SentimentLabel::Positive
        } else if self.negative >= self.neutral {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Whether `total` equals the sum of the label counts
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.total == self.positive + self.negative + self.neutral
    }

    /// Percentage of `total` for one label, rounded to one decimal place
    #[must_use]
    pub fn percentage(&self, label: SentimentLabel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.get(label) as f64 / self.total as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

impl Add for MoodCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            positive: self.positive + rhs.positive,
            negative: self.negative + rhs.negative,
            neutral: self.neutral + rhs.neutral,
            total: self.total + rhs.total,
        }
    }
}

impl Sum for MoodCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}

/// One persisted counter row per (user, calendar day)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMoodCounter {
    /// Owning user
    pub user_id: String,
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Tallies for the day
    #[serde(flatten)]
    pub counts: MoodCounts,
}

impl DailyMoodCounter {
    /// Dominant mood for the day
    #[must_use]
    pub fn dominant_mood(&self) -> SentimentLabel {
        self.counts.dominant()
    }
}

/// One processed chat exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Unique record ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// What the user wrote
    pub message: String,
    /// What the assistant answered
    pub response: String,
    /// Classified sentiment
    pub sentiment: SentimentLabel,
    /// Classifier confidence
    pub confidence: f64,
    /// When the exchange happened (RFC 3339)
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_mood_tie_prefers_positive() {
        assert_eq!(MoodCounts::new(5, 5, 0).dominant(), SentimentLabel::Positive);
    }

    #[test]
    fn test_dominant_mood_negative_beats_neutral_on_tie() {
        assert_eq!(MoodCounts::new(3, 5, 5).dominant(), SentimentLabel::Negative);
    }

    #[test]
    fn test_dominant_mood_neutral_when_strictly_highest() {
        assert_eq!(MoodCounts::new(1, 2, 3).dominant(), SentimentLabel::Neutral);
    }

    #[test]
    fn test_increment_keeps_total_consistent() {
        let mut counts = MoodCounts::default();
        for label in [
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
            SentimentLabel::Positive,
        ] {
            counts.increment(label);
            assert!(counts.is_consistent());
        }
        assert_eq!(counts, MoodCounts::new(2, 1, 1));
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert!((SentimentResult::new(SentimentLabel::Positive, 1.7).confidence - 1.0).abs() < f64::EPSILON);
        assert!(SentimentResult::new(SentimentLabel::Positive, -0.2).confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_model_label_mapping() {
        assert_eq!(SentimentLabel::from_model_label("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_model_label("NEGATIVE"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_model_label("LABEL_2"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        let counts = MoodCounts::new(1, 1, 1);
        assert!((counts.percentage(SentimentLabel::Positive) - 33.3).abs() < 1e-9);
        assert!(MoodCounts::default().percentage(SentimentLabel::Negative).abs() < f64::EPSILON);
    }
}
