// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core data model.

use thiserror::Error;

/// Errors raised while building or converting core types.
#[derive(Debug, Error)]
pub enum LogtrailError {
	#[error("invalid log level: {0}")]
	InvalidLevel(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, LogtrailError>;
