// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Code snippet extraction around a target line.

use std::path::Path;

use logtrail_core::{CodeSnippetLine, Snippet};
use tracing::trace;

/// Lines of context kept on each side of the target line.
pub const DEFAULT_PADDING: usize = 8;

/// Read `path` and return the lines around `target`.
///
/// Returns `None` when the file cannot be read or is empty.
pub fn extract_snippet(path: impl AsRef<Path>, target: u32, padding: usize) -> Option<Snippet> {
	let path = path.as_ref();
	let bytes = match std::fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) => {
			trace!(path = %path.display(), error = %e, "snippet source unreadable");
			return None;
		}
	};
	extract_snippet_from_str(&String::from_utf8_lossy(&bytes), target, padding)
}

/// Window of lines `[target - padding, target + padding]` clamped to the content.
///
/// `target` is itself clamped into `[1, total_lines]`, so a line reported past
/// the end of the file still yields a snippet around the last line. Exactly one
/// returned line is highlighted.
pub fn extract_snippet_from_str(content: &str, target: u32, padding: usize) -> Option<Snippet> {
	let lines: Vec<&str> = content.lines().collect();
	let total = lines.len();
	if total == 0 {
		return None;
	}

	let target = (target as usize).clamp(1, total);
	let start = target.saturating_sub(padding).max(1);
	let end = target.saturating_add(padding).min(total);

	let snippet = (start..=end)
		.map(|number| CodeSnippetLine {
			line: number as u32,
			content: lines[number - 1].to_string(),
			highlight: number == target,
		})
		.collect();
	Some(snippet)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn numbered(n: usize) -> String {
		(1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
	}

	#[test]
	fn window_around_middle_line() {
		let snippet = extract_snippet_from_str(&numbered(30), 15, 2).unwrap();
		let numbers: Vec<u32> = snippet.iter().map(|l| l.line).collect();
		assert_eq!(numbers, vec![13, 14, 15, 16, 17]);
		assert_eq!(snippet[2].content, "line 15");
		assert!(snippet[2].highlight);
	}

	#[test]
	fn window_clamped_at_start() {
		let snippet = extract_snippet_from_str(&numbered(30), 1, 8).unwrap();
		assert_eq!(snippet.first().unwrap().line, 1);
		assert_eq!(snippet.last().unwrap().line, 9);
	}

	#[test]
	fn target_past_end_clamps_to_last_line() {
		let snippet = extract_snippet_from_str(&numbered(5), 99, 2).unwrap();
		let numbers: Vec<u32> = snippet.iter().map(|l| l.line).collect();
		assert_eq!(numbers, vec![3, 4, 5]);
		assert!(snippet.last().unwrap().highlight);
	}

	#[test]
	fn target_zero_clamps_to_first_line() {
		let snippet = extract_snippet_from_str(&numbered(5), 0, 1).unwrap();
		assert_eq!(snippet.len(), 2);
		assert!(snippet[0].highlight);
	}

	#[test]
	fn empty_content_has_no_snippet() {
		assert!(extract_snippet_from_str("", 1, 8).is_none());
	}

	#[test]
	fn unreadable_file_has_no_snippet() {
		assert!(extract_snippet("/nonexistent/logtrail/file.php", 3, 8).is_none());
		assert!(extract_snippet("", 3, 8).is_none());
	}

	#[test]
	fn reads_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "<?php\n\nthrow new Exception();\n").unwrap();

		let snippet = extract_snippet(file.path(), 3, 8).unwrap();
		assert_eq!(snippet.len(), 3);
		assert_eq!(snippet[2].content, "throw new Exception();");
		assert!(snippet[2].highlight);
	}

	#[test]
	fn empty_file_has_no_snippet() {
		let file = NamedTempFile::new().unwrap();
		assert!(extract_snippet(file.path(), 1, 8).is_none());
	}

	proptest! {
		#[test]
		fn snippet_bounds_hold(total in 1usize..200, target in 0u32..400, padding in 0usize..20) {
			let snippet = extract_snippet_from_str(&numbered(total), target, padding).unwrap();
			let clamped = (target as usize).clamp(1, total);

			prop_assert!(snippet.len() <= (2 * padding + 1).min(total));
			prop_assert!(snippet.first().unwrap().line >= 1);
			prop_assert!(snippet.last().unwrap().line as usize <= total);

			let highlighted: Vec<_> = snippet.iter().filter(|l| l.highlight).collect();
			prop_assert_eq!(highlighted.len(), 1);
			prop_assert_eq!(highlighted[0].line as usize, clamped);

			let expected_len = (clamped + padding).min(total) - clamped.saturating_sub(padding).max(1) + 1;
			prop_assert_eq!(snippet.len(), expected_len);
		}
	}
}
