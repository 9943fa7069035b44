// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use thiserror::Error;

/// Every failure the scope engine can hit. None of these escape the
/// controller; they are logged and replaced by a safe default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Failed to load scope catalog: {0}")]
    LoadFailure(String),
    #[error("Invalid pattern list on '{key}': {reason}")]
    PatternParseFailure { key: String, reason: String },
    #[error("Missing element: {0}")]
    MissingElement(String),
}

impl From<reqwest::Error> for ScopeError {
    fn from(e: reqwest::Error) -> Self {
        ScopeError::LoadFailure(e.to_string())
    }
}
