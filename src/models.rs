// ABOUTME: Re-export of the shared domain models from moodwell-core
// ABOUTME: Sentiment labels, mood counts, daily counters, and conversation records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

pub use moodwell_core::models::*;
