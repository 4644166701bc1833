// ABOUTME: Core types and constants for the Moodwell mood-support chat platform
// ABOUTME: Foundation crate with error handling, sentiment and mood models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

#![deny(unsafe_code)]

//! # Moodwell Core
//!
//! Foundation crate shared by the intelligence crate and the server. It changes rarely,
//! which keeps incremental rebuilds of the workspace cheap.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, `AppResult`
//! - **constants**: thresholds, windows and limits organized by domain
//! - **models**: `SentimentLabel`, `MoodCounts`, `DailyMoodCounter`, `ConversationRecord`

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
