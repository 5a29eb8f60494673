// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LogtrailError;

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	Debug,
	Info,
	Notice,
	Warning,
	Error,
	Critical,
	Alert,
	Emergency,
}

impl Level {
	pub const ALL: [Level; 8] = [
		Level::Debug,
		Level::Info,
		Level::Notice,
		Level::Warning,
		Level::Error,
		Level::Critical,
		Level::Alert,
		Level::Emergency,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Notice => "notice",
			Self::Warning => "warning",
			Self::Error => "error",
			Self::Critical => "critical",
			Self::Alert => "alert",
			Self::Emergency => "emergency",
		}
	}
}

impl Default for Level {
	fn default() -> Self {
		Self::Debug
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Level {
	type Err = LogtrailError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"notice" => Ok(Self::Notice),
			"warning" | "warn" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			"critical" => Ok(Self::Critical),
			"alert" => Ok(Self::Alert),
			"emergency" => Ok(Self::Emergency),
			_ => Err(LogtrailError::InvalidLevel(s.to_string())),
		}
	}
}
