// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for NeuroSync

use thiserror::Error;

/// Result type alias for NeuroSync operations
pub type Result<T> = std::result::Result<T, NeuroSyncError>;

/// NeuroSync error types
#[derive(Error, Debug)]
pub enum NeuroSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Language model not available: {0}")]
    LlmUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
