// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Logtrail SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, LogtrailSdkError>;

/// Errors surfaced by delivery. Enrichment itself never fails.
#[derive(Debug, Error)]
pub enum LogtrailSdkError {
	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Ingest endpoint returned a non-success status.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body.
		message: String,
	},

	/// Rate limited by the ingest endpoint.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		/// Value of the `Retry-After` header, if present.
		retry_after_secs: Option<u64>,
	},

	/// Failed to serialize the payload.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Gzip compression failed.
	#[error("compression error: {0}")]
	Compression(#[from] std::io::Error),

	#[error("configuration error: {0}")]
	Config(#[from] logtrail_config::ConfigError),
}
