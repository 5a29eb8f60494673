// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Enriched exception records in their compact wire form.
//!
//! Field names are abbreviated on the wire (`f`, `l`, `fn`, `cl`, `lp`, `s`)
//! to keep payloads small; the Rust names spell them out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A window of source lines around a target line.
pub type Snippet = Vec<CodeSnippetLine>;

/// One line of a code snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippetLine {
	#[serde(rename = "l")]
	pub line: u32,
	#[serde(rename = "c")]
	pub content: String,
	/// True only for the target line
	#[serde(rename = "h")]
	pub highlight: bool,
}

/// A stack frame after source mapping and path compression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedFrame {
	/// Path relative to the application root
	#[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
	pub line: Option<u32>,
	#[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
	pub function: Option<String>,
	#[serde(rename = "cl", default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
	#[serde(rename = "lp", with = "flag")]
	pub library: bool,
	#[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
	pub snippet: Option<Snippet>,
}

/// Throw-site location with its snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryFrame {
	#[serde(rename = "f")]
	pub file: String,
	#[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
	pub line: Option<u32>,
	#[serde(rename = "lp", with = "flag")]
	pub library: bool,
	#[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
	pub snippet: Option<Snippet>,
}

/// Normalized exception placed under `context.exception`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
	pub class: String,
	pub message: String,
	/// Relative path, re-pointed at template source when mapped
	pub file: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub line: Option<u32>,
	pub trace: Vec<CompressedFrame>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary: Option<PrimaryFrame>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sql_error: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sql: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bindings: Option<Vec<Value>>,
}

/// Serializes a bool as `0`/`1`; accepts either form when reading.
mod flag {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u8(u8::from(*value))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Repr {
			Int(u8),
			Bool(bool),
		}

		match Repr::deserialize(deserializer)? {
			Repr::Int(n) => Ok(n != 0),
			Repr::Bool(b) => Ok(b),
		}
	}
}
