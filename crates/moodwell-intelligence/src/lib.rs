// ABOUTME: Mood intelligence crate: reply selection and dashboard insight rules
// ABOUTME: Pure functions over core models; randomness is always supplied by the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![deny(unsafe_code)]

//! # Moodwell Intelligence
//!
//! Logic that turns classified messages into replies and daily counters into insights.
//! Nothing here performs I/O, which keeps the rules testable without a database.

/// Insight rules for the dashboard
pub mod insights;

/// Template replies, topic suggestions, and coping strategies
pub mod responses;

pub use insights::{Insight, InsightConfig, InsightGenerator, InsightInput, InsightKind};
pub use responses::{CopingKind, ResponseGenerator};
