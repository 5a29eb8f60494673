// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Line marker injection for template precompilation.
//!
//! Each template line is prefixed with an inert comment carrying its original
//! line number, e.g. `<?php /*LT_LINE:12*/ ?>`. The template compiler passes the
//! comment through to the compiled artifact, where [`parse_marker`] recovers it.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Tag embedded in every marker.
pub const MARKER_TAG: &str = "LT_LINE";

static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"LT_LINE:(\d+)").unwrap());

/// A text transform applied to template source before it is compiled.
pub trait Precompiler: Send + Sync {
	fn precompile(&self, source: &str) -> String;
}

impl<F> Precompiler for F
where
	F: Fn(&str) -> String + Send + Sync,
{
	fn precompile(&self, source: &str) -> String {
		self(source)
	}
}

/// Prefixes every template line with a line-number marker.
#[derive(Debug, Clone)]
pub struct MarkerInjector {
	enabled: bool,
	open: String,
	close: String,
}

impl Default for MarkerInjector {
	fn default() -> Self {
		Self {
			enabled: true,
			open: "<?php /*".to_string(),
			close: "*/ ?>".to_string(),
		}
	}
}

impl MarkerInjector {
	/// Injector using the default comment delimiters.
	///
	/// A disabled injector returns its input unchanged.
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled,
			..Self::default()
		}
	}

	/// Override the comment delimiters wrapped around `LT_LINE:<n>`.
	pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
		self.open = open.into();
		self.close = close.into();
		self
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Marker text for a 1-based line number.
	pub fn marker(&self, line: usize) -> String {
		format!("{}{}:{}{}", self.open, MARKER_TAG, line, self.close)
	}

	/// Annotate template source with one marker per line.
	pub fn inject(&self, source: &str) -> String {
		if !self.enabled {
			return source.to_string();
		}

		let normalized = normalize_line_endings(source);
		let mut out = String::with_capacity(normalized.len() + normalized.len() / 4);
		for (idx, line) in normalized.split('\n').enumerate() {
			if idx > 0 {
				out.push('\n');
			}
			out.push_str(&self.marker(idx + 1));
			out.push_str(line);
		}
		out
	}
}

impl Precompiler for MarkerInjector {
	fn precompile(&self, source: &str) -> String {
		self.inject(source)
	}
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
	if source.contains('\r') {
		Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
	} else {
		Cow::Borrowed(source)
	}
}

/// Original line number encoded in a compiled line, if it carries a marker.
pub fn parse_marker(line: &str) -> Option<u32> {
	MARKER_REGEX
		.captures(line)
		.and_then(|caps| caps.get(1))
		.and_then(|m| m.as_str().parse().ok())
}
