// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Chat pipeline, reply selection, dashboard read model, and account flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

//! Domain service layer
//!
//! Route handlers stay thin: they extract and authenticate, then call into these functions,
//! which hold the business rules and talk to the database.

/// Registration, verification codes, login, and profile validation
pub mod accounts;

/// Message validation and the classify/reply/persist/count pipeline
pub mod chat;

/// Dashboard read model
pub mod dashboard;

/// Template or model-generated replies
pub mod responder;

pub use responder::Responder;
