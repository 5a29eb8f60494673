// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log events and the raw exceptions they may carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::Level;

/// A single application log call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
	pub level: Level,
	pub message: String,
	#[serde(default)]
	pub context: Map<String, Value>,
	/// Exception attached to the call, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception: Option<RawException>,
	pub timestamp: DateTime<Utc>,
}

impl LogEvent {
	pub fn new(level: Level, message: impl Into<String>) -> Self {
		Self {
			level,
			message: message.into(),
			context: Map::new(),
			exception: None,
			timestamp: Utc::now(),
		}
	}

	pub fn with_context(mut self, context: Map<String, Value>) -> Self {
		self.context = context;
		self
	}

	pub fn with_exception(mut self, exception: RawException) -> Self {
		self.exception = Some(exception);
		self
	}

	pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = timestamp;
		self
	}
}

/// A thrown error as reported by the host runtime.
///
/// Paths are absolute as reported; frames are innermost first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawException {
	pub class: String,
	pub message: String,
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub line: Option<u32>,
	#[serde(default)]
	pub frames: Vec<StackFrame>,
	/// Present only when the error came from the database layer
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub database: Option<DatabaseError>,
}

impl RawException {
	pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			class: class.into(),
			message: message.into(),
			..Self::default()
		}
	}

	pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
		self.file = Some(file.into());
		self.line = Some(line);
		self
	}

	pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
		self.frames = frames;
		self
	}

	pub fn with_database(mut self, database: DatabaseError) -> Self {
		self.database = Some(database);
		self
	}
}

/// Structured diagnostics exposed by database-layer errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseError {
	pub sql: String,
	#[serde(default)]
	pub bindings: Vec<Value>,
}

/// One entry of a raw call stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackFrame {
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub line: Option<u32>,
	#[serde(default)]
	pub function: Option<String>,
	#[serde(default)]
	pub class: Option<String>,
}

impl StackFrame {
	pub fn new(file: impl Into<String>, line: u32) -> Self {
		Self {
			file: Some(file.into()),
			line: Some(line),
			..Self::default()
		}
	}

	pub fn function(mut self, function: impl Into<String>) -> Self {
		self.function = Some(function.into());
		self
	}

	pub fn class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}
}
