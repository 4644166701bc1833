// ABOUTME: Re-export of the shared error types from moodwell-core
// ABOUTME: Lets server modules use crate::errors without naming the core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

pub use moodwell_core::errors::*;
