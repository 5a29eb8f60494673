// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload records before and after signing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::Level;

/// Assembled event record that has not been signed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedPayload {
	pub level: Level,
	pub message: String,
	pub context: Map<String, Value>,
	pub timestamp: DateTime<Utc>,
}

impl UnsignedPayload {
	/// Location of the normalized exception as `(file, line)` strings.
	///
	/// Both are empty when the context carries no exception record.
	pub fn exception_location(&self) -> (String, String) {
		exception_location(&self.context)
	}

	/// Bytes covered by the signature: `level ++ message ++ file ++ line`.
	pub fn signing_input(&self) -> String {
		signing_input(self.level, &self.message, &self.context)
	}

	/// Seal the payload with a signature computed over [`signing_input`](Self::signing_input).
	pub fn into_signed(self, signature: String) -> Payload {
		Payload {
			level: self.level,
			message: self.message,
			context: self.context,
			timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
			signature,
		}
	}
}

/// Signed, transmission-ready payload.
///
/// Fields are read-only so the signature stays valid for the payload's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
	level: Level,
	message: String,
	context: Map<String, Value>,
	timestamp: String,
	signature: String,
}

impl Payload {
	pub fn level(&self) -> Level {
		self.level
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn context(&self) -> &Map<String, Value> {
		&self.context
	}

	/// ISO-8601 timestamp with UTC offset.
	pub fn timestamp(&self) -> &str {
		&self.timestamp
	}

	pub fn signature(&self) -> &str {
		&self.signature
	}

	/// Recompute the signed input from the payload's current fields.
	pub fn signing_input(&self) -> String {
		signing_input(self.level, &self.message, &self.context)
	}
}

fn exception_location(context: &Map<String, Value>) -> (String, String) {
	let Some(Value::Object(exception)) = context.get("exception") else {
		return (String::new(), String::new());
	};

	let file = match exception.get("file") {
		Some(Value::String(s)) => s.clone(),
		_ => String::new(),
	};
	let line = match exception.get("line") {
		Some(Value::Number(n)) => n.to_string(),
		Some(Value::String(s)) => s.clone(),
		_ => String::new(),
	};
	(file, line)
}

fn signing_input(level: Level, message: &str, context: &Map<String, Value>) -> String {
	let (file, line) = exception_location(context);
	format!("{level}{message}{file}{line}")
}
