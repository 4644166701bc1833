// ABOUTME: HTTP middleware for authentication, CORS, and request body extraction
// ABOUTME: Shared by every route module so errors keep one response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Moodwell Contributors

pub mod auth;
pub mod cors;
pub mod json;

// Authentication
pub use auth::{authenticate_request, extract_bearer_token};

// CORS configuration
pub use cors::setup_cors;

// Request bodies
pub use json::ValidatedJson;
