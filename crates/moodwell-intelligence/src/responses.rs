// ABOUTME: Template-based empathetic reply selection with keyword-driven wellbeing suggestions
// ABOUTME: Also serves the coping strategy catalog grouped by stress, anxiety, sadness, and general
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! # Response Generation
//!
//! Replies are chosen from a per-sentiment template bucket. Low-confidence classifications
//! always use the neutral bucket. When the message mentions a known topic, one suggestion
//! from the matching topic groups is appended.
//!
//! The generator never touches global randomness: callers pass the RNG, so a seeded
//! `StdRng` makes every reply reproducible.

use std::fmt;
use std::str::FromStr;

use moodwell_core::constants::sentiment::LOW_CONFIDENCE_THRESHOLD;
use moodwell_core::models::{SentimentLabel, SentimentResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const POSITIVE_TEMPLATES: [&str; 5] = [
    "That's wonderful to hear! 😊 It sounds like you're having a good experience. What's been going particularly well for you?",
    "I'm so glad you're feeling positive! 🌟 Celebrating these moments is important. How can we build on this feeling?",
    "It's great that you're sharing something positive with me! These moments of joy are precious. What made this especially meaningful for you?",
    "Your positive energy is lovely! ✨ It's beautiful when we can appreciate the good things in life. Tell me more about what's bringing you happiness.",
    "That sounds really encouraging! 🙂 I love hearing when things are going well. What would you like to focus on to maintain this positive momentum?",
];

const NEGATIVE_TEMPLATES: [&str; 5] = [
    "I hear you, and I want you to know that what you're feeling is valid. 💙 Difficult emotions can be really challenging. Would you like to talk more about what's troubling you?",
    "That sounds really tough, and I'm sorry you're going through this. 🤗 Sometimes just expressing these feelings can help. What support do you need right now?",
    "I can sense that you're struggling, and that takes courage to share. 💪 You don't have to go through this alone. What would feel most helpful for you in this moment?",
    "It sounds like you're carrying some heavy feelings right now. 💛 Remember that it's okay to not be okay. Would you like to explore some coping strategies together?",
    "I'm here to listen and support you through this difficult time. 🫂 Your feelings matter, and so do you. What's been the hardest part about this situation?",
];

const NEUTRAL_TEMPLATES: [&str; 5] = [
    "Thank you for sharing that with me. 💭 I'm here to listen and support you. What's on your mind today?",
    "I appreciate you taking the time to talk with me. 🌸 Every conversation matters. How are you feeling right now?",
    "It's good that you're here and willing to open up. 🤝 That shows strength. What would you like to focus on in our conversation?",
    "I'm glad you felt comfortable sharing that. 💬 Sometimes talking things through can bring clarity. What's been occupying your thoughts lately?",
    "Thank you for trusting me with your thoughts. 🌿 I'm here to support you however I can. What feels most important to discuss right now?",
];

/// A topic the message may mention, with the keywords that detect it and the
/// suggestions it contributes.
struct SuggestionGroup {
    keywords: &'static [&'static str],
    suggestions: &'static [&'static str],
}

const SUGGESTION_GROUPS: [SuggestionGroup; 5] = [
    // stress
    SuggestionGroup {
        keywords: &["stress", "stressed", "overwhelmed", "pressure"],
        suggestions: &[
            "\n\n💡 Here's a quick stress-relief technique: Try the 4-7-8 breathing method - inhale for 4 counts, hold for 7, exhale for 8.",
            "\n\n🧘\u{200d}♀️ When feeling overwhelmed, try grounding yourself: Name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, and 1 you can taste.",
        ],
    },
    // anxiety
    SuggestionGroup {
        keywords: &["anxious", "anxiety", "worried", "nervous"],
        suggestions: &[
            "\n\n🌱 For anxiety, try this: Focus on your breath and remind yourself 'This feeling will pass.' You're stronger than you know.",
            "\n\n💙 Anxiety can feel overwhelming, but remember: you've handled difficult situations before, and you can handle this too.",
        ],
    },
    // sadness
    SuggestionGroup {
        keywords: &["sad", "depressed", "down", "lonely"],
        suggestions: &[
            "\n\n🌈 When feeling down, small acts of self-care can help: a warm cup of tea, a short walk, or calling someone you care about.",
            "\n\n🤗 Remember that sadness is a natural emotion, and it's okay to feel this way. You matter, and this feeling is temporary.",
        ],
    },
    // work
    SuggestionGroup {
        keywords: &["work", "job", "career", "boss"],
        suggestions: &[
            "\n\n💼 Work challenges can be tough. Remember to set boundaries and take breaks when possible.",
        ],
    },
    // relationships
    SuggestionGroup {
        keywords: &["relationship", "friend", "family", "partner"],
        suggestions: &[
            "\n\n💕 Relationships can be complex. Open, honest communication often helps, and remember that your feelings are valid.",
        ],
    },
];

const STRESS_STRATEGIES: [&str; 4] = [
    "🧘\u{200d}♀️ **Deep Breathing**: Inhale slowly for 4 counts, hold for 4, exhale for 6. Repeat 5 times.",
    "🚶\u{200d}♀️ **Take a Walk**: Even 5 minutes of movement can help clear your mind.",
    "📝 **Brain Dump**: Write down everything you're thinking about for 10 minutes without editing.",
    "🎵 **Listen to Music**: Choose something that matches your mood, then gradually shift to more uplifting songs.",
];

const ANXIETY_STRATEGIES: [&str; 4] = [
    "🌍 **5-4-3-2-1 Technique**: Name 5 things you see, 4 you can touch, 3 you hear, 2 you smell, 1 you taste.",
    "💭 **Question Your Thoughts**: Ask yourself 'Is this thought helpful? Is it likely to happen? What would I tell a friend?'",
    "🤗 **Self-Compassion**: Speak to yourself as you would to a dear friend going through the same thing.",
    "📱 **Progressive Muscle Relaxation**: Tense and release each muscle group for 5 seconds, starting from your toes.",
];

const SADNESS_STRATEGIES: [&str; 4] = [
    "☀️ **Gentle Movement**: Try some light stretching or yoga to help shift your energy.",
    "💌 **Write a Letter**: Write to yourself with kindness, or to someone you care about (you don't have to send it).",
    "🌱 **Small Accomplishments**: Do one tiny task that makes you feel productive, like making your bed or organizing one drawer.",
    "🎨 **Creative Expression**: Draw, color, sing, or create something - it doesn't need to be 'good'.",
];

const GENERAL_STRATEGIES: [&str; 4] = [
    "☕ **Mindful Moments**: Spend 2 minutes fully focused on one activity - drinking tea, feeling sunshine, etc.",
    "📚 **Gratitude Practice**: Write down 3 small things you're grateful for today.",
    "🌸 **Self-Care Check**: Ask yourself what you need right now - rest, nutrition, connection, or movement?",
    "📞 **Reach Out**: Consider talking to a friend, family member, or mental health professional.",
];

/// Category of coping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopingKind {
    /// Stress relief
    Stress,
    /// Anxiety management
    Anxiety,
    /// Low mood
    Sadness,
    /// General self-care
    #[default]
    General,
}

impl CopingKind {
    /// Lowercase name used in query strings and responses
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stress => "stress",
            Self::Anxiety => "anxiety",
            Self::Sadness => "sadness",
            Self::General => "general",
        }
    }

    /// Resolve an optional query value; unknown or missing kinds become `General`.
    ///
    /// Kinds match exactly, so `Anxiety` or ` stress` fall back to `General` too.
    #[must_use]
    pub fn from_query(kind: Option<&str>) -> Self {
        kind.and_then(|k| k.parse().ok()).unwrap_or_default()
    }

    const fn strategies(self) -> &'static [&'static str] {
        match self {
            Self::Stress => &STRESS_STRATEGIES,
            Self::Anxiety => &ANXIETY_STRATEGIES,
            Self::Sadness => &SADNESS_STRATEGIES,
            Self::General => &GENERAL_STRATEGIES,
        }
    }
}

impl fmt::Display for CopingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stress" => Ok(Self::Stress),
            "anxiety" => Ok(Self::Anxiety),
            "sadness" => Ok(Self::Sadness),
            "general" => Ok(Self::General),
            other => Err(format!("unknown coping strategy kind: {other}")),
        }
    }
}

/// Selects empathetic replies and coping strategies
#[derive(Debug, Clone, Copy)]
pub struct ResponseGenerator {
    /// Classifications below this confidence answer from the neutral bucket
    confidence_threshold: f64,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGenerator {
    /// Create a generator with the standard confidence threshold
    #[must_use]
    pub const fn new() -> Self {
        Self::with_threshold(LOW_CONFIDENCE_THRESHOLD)
    }

    /// Create a generator with a custom confidence threshold
    #[must_use]
    pub const fn with_threshold(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Label used for tone matching.
    ///
    /// Low-confidence classifications are treated as neutral. The recorded label is unaffected.
    #[must_use]
    pub fn tone_label(&self, sentiment: &SentimentResult) -> SentimentLabel {
        if sentiment.confidence < self.confidence_threshold {
            SentimentLabel::Neutral
        } else {
            sentiment.label
        }
    }

    /// Template bucket for a tone label
    #[must_use]
    pub const fn templates(label: SentimentLabel) -> &'static [&'static str] {
        match label {
            SentimentLabel::Positive => &POSITIVE_TEMPLATES,
            SentimentLabel::Negative => &NEGATIVE_TEMPLATES,
            SentimentLabel::Neutral => &NEUTRAL_TEMPLATES,
        }
    }

    /// Build a reply for `message` given its classification.
    ///
    /// The template bucket comes from [`Self::tone_label`], so classifications below the
    /// confidence threshold always answer from the neutral bucket.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        message: &str,
        sentiment: &SentimentResult,
        rng: &mut R,
    ) -> String {
        let bucket = Self::templates(self.tone_label(sentiment));
        let base = bucket.choose(rng).copied().unwrap_or(NEUTRAL_TEMPLATES[0]);

        let pool = Self::suggestion_pool(message);
        match pool.choose(rng) {
            Some(suggestion) => format!("{base}{suggestion}"),
            None => base.to_owned(),
        }
    }

    /// All suggestions whose topic keywords appear in the message (case-insensitive substring)
    #[must_use]
    pub fn suggestion_pool(message: &str) -> Vec<&'static str> {
        let lowered = message.to_lowercase();
        SUGGESTION_GROUPS
            .iter()
            .filter(|group| group.keywords.iter().any(|kw| lowered.contains(kw)))
            .flat_map(|group| group.suggestions.iter().copied())
            .collect()
    }

    /// Pick one coping strategy of the given kind
    pub fn coping_strategy<R: Rng + ?Sized>(kind: CopingKind, rng: &mut R) -> &'static str {
        kind.strategies()
            .choose(rng)
            .copied()
            .unwrap_or(GENERAL_STRATEGIES[0])
    }
}
