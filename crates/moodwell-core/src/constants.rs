// ABOUTME: Application constants grouped by domain for the Moodwell platform
// ABOUTME: Sentiment thresholds, insight rules, dashboard windows, OTP and input limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Constants module
//!
//! Pure data constants organized by domain. Environment-driven values live in the server
//! crate's `config` module.

/// Sentiment classification constants
pub mod sentiment {
    /// Confidence reported when the classifier is unavailable or fails
    pub const FALLBACK_CONFIDENCE: f64 = 0.5;
    /// Below this confidence a label is not trusted for tone matching
    pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;
    /// Default hosted sentiment model
    pub const DEFAULT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
}

/// Insight rule constants
pub mod insights {
    /// Maximum insights returned to the dashboard
    pub const MAX_INSIGHTS: usize = 4;
    /// Window size (in counters) for the consistency and growth rules
    pub const WEEK_LEN: usize = 7;
    /// Active days required in the most recent week for the consistency insight
    pub const CONSISTENCY_MIN_ACTIVE_DAYS: usize = 5;
    /// Lifetime total required before the support insight is shown
    pub const SUPPORT_MIN_TOTAL: i64 = 5;
    /// Conversation counts that trigger a milestone insight
    pub const MILESTONES: [i64; 5] = [10, 25, 50, 100, 200];
}

/// Dashboard read-model windows
pub mod dashboard {
    /// Days covered by the mood chart
    pub const CHART_WINDOW_DAYS: i64 = 30;
    /// Days covered by the weekly summary
    pub const WEEKLY_WINDOW_DAYS: i64 = 7;
    /// Recent conversations shown on the dashboard
    pub const RECENT_CONVERSATIONS: i64 = 10;
}

/// Chat constants
pub mod chat {
    /// Default number of records returned by the chat history endpoint
    pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
    /// Upper bound for the chat history endpoint
    pub const MAX_HISTORY_LIMIT: i64 = 200;
    /// Maximum accepted message length in characters
    pub const MAX_MESSAGE_CHARS: usize = 1000;
}

/// LLM generation parameters
pub mod llm {
    /// Token cap for generated replies
    pub const MAX_OUTPUT_TOKENS: u32 = 400;
    /// Sampling temperature for generated replies
    pub const TEMPERATURE: f32 = 0.7;
    /// Default Gemini model
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
    /// Models suggested when generation fails, if the catalog lists them
    pub const STABLE_MODELS: [&str; 4] = [
        "gemini-2.5-flash",
        "gemini-2.5-pro",
        "gemini-flash-latest",
        "gemini-pro-latest",
    ];
}

/// Account and verification constants
pub mod account {
    /// Number of digits in an email verification code
    pub const OTP_LENGTH: usize = 6;
    /// Minutes before a verification code expires
    pub const OTP_EXPIRY_MINUTES: i64 = 10;
    /// Maximum bio length
    pub const MAX_BIO_CHARS: usize = 500;
    /// Maximum first/last name length
    pub const MAX_NAME_CHARS: usize = 30;
    /// Minimum password length
    pub const MIN_PASSWORD_CHARS: usize = 8;
    /// Maximum username length
    pub const MAX_USERNAME_CHARS: usize = 150;
}

/// Service names used in logs and token audiences
pub mod service_names {
    /// Server name
    pub const MOODWELL_SERVER: &str = "moodwell-server";
    /// JWT audience
    pub const JWT_AUDIENCE: &str = "moodwell-web";
}
