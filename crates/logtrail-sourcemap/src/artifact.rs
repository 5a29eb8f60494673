// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compiled template artifact detection and reverse line mapping.
//!
//! Compiled templates end with a footer naming their source, e.g.
//! `<?php /**PATH /app/resources/views/home.blade.php ENDPATH**/ ?>`, and carry
//! the `LT_LINE` markers written by [`MarkerInjector`](crate::MarkerInjector).

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use regex::Regex;
use tracing::{debug, trace};

use crate::marker::parse_marker;
use crate::paths::normalize_separators;

/// Bytes read from the end of a compiled file when looking for the source footer.
pub const TAIL_WINDOW: u64 = 8192;
/// Bytes read from the start of a compiled file when looking for a header comment.
pub const HEAD_WINDOW: u64 = 4096;

/// Where compiled templates live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledLayout {
	/// Directory fragment every compiled artifact path contains
	pub compiled_dir: String,
	pub compiled_extension: String,
	/// Suffix of original template files
	pub template_extension: String,
}

impl Default for CompiledLayout {
	fn default() -> Self {
		Self {
			compiled_dir: "/storage/framework/views/".to_string(),
			compiled_extension: ".php".to_string(),
			template_extension: ".blade.php".to_string(),
		}
	}
}

/// A compiled location mapped back to template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
	/// Absolute path of the original template
	pub file: String,
	/// Template line when a marker was found, otherwise the compiled line
	pub line: Option<u32>,
	pub line_mapped: bool,
}

/// Resolves compiled template artifacts back to their templates.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
	layout: CompiledLayout,
	footer: Regex,
	header: Regex,
}

impl Default for ArtifactResolver {
	fn default() -> Self {
		Self::new(CompiledLayout::default())
	}
}

impl ArtifactResolver {
	pub fn new(layout: CompiledLayout) -> Self {
		let ext = regex::escape(&layout.template_extension);
		let footer = Regex::new(&format!(r"\*\*PATH\s+(.+?{ext})\s+ENDPATH\*\*"))
			.expect("escaped extension yields a valid footer pattern");
		let header = Regex::new(&format!(r"/\*\s*(.+?{ext})\s*\*/"))
			.expect("escaped extension yields a valid header pattern");
		Self {
			layout,
			footer,
			header,
		}
	}

	pub fn layout(&self) -> &CompiledLayout {
		&self.layout
	}

	/// True iff `path` sits in the compiled output directory with the compiled extension.
	pub fn is_compiled_artifact(&self, path: &str) -> bool {
		let normalized = normalize_separators(path);
		normalized.contains(&self.layout.compiled_dir)
			&& normalized.ends_with(&self.layout.compiled_extension)
	}

	/// Path of the template a compiled artifact was generated from.
	///
	/// Looks for the `**PATH ... ENDPATH**` footer in the file's tail, then for a
	/// `/* ... */` header comment in its head.
	pub fn resolve_original_source(&self, compiled: impl AsRef<Path>) -> Option<String> {
		let compiled = compiled.as_ref();

		let tail = match read_tail(compiled, TAIL_WINDOW) {
			Ok(tail) => tail,
			Err(e) => {
				debug!(path = %compiled.display(), error = %e, "compiled artifact unreadable");
				return None;
			}
		};
		if let Some(found) = first_capture(&self.footer, &tail) {
			return Some(found);
		}

		let head = read_head(compiled, HEAD_WINDOW).ok()?;
		let found = first_capture(&self.header, &head);
		if found.is_none() {
			trace!(path = %compiled.display(), "no source path marker in compiled artifact");
		}
		found
	}

	/// Template line for a compiled line: the nearest marker at or before it.
	pub fn map_compiled_line(&self, compiled: impl AsRef<Path>, compiled_line: u32) -> Option<u32> {
		let compiled = compiled.as_ref();
		let bytes = match std::fs::read(compiled) {
			Ok(bytes) => bytes,
			Err(e) => {
				debug!(path = %compiled.display(), error = %e, "compiled artifact unreadable");
				return None;
			}
		};
		let content = String::from_utf8_lossy(&bytes);
		let lines: Vec<&str> = content.lines().collect();

		let upto = (compiled_line as usize).min(lines.len());
		lines[..upto].iter().rev().find_map(|line| parse_marker(line))
	}

	/// Map a raw `(file, line)` to template source when it is a compiled artifact.
	///
	/// Returns `None` when the file is not an artifact or its template cannot be
	/// determined; the caller keeps the raw location in that case.
	pub fn resolve(&self, file: &str, line: u32) -> Option<ResolvedLocation> {
		if !self.is_compiled_artifact(file) {
			return None;
		}

		let original = self.resolve_original_source(file)?;
		let mapped = self.map_compiled_line(file, line);

		debug!(
			compiled = %file,
			compiled_line = line,
			template = %original,
			template_line = ?mapped,
			"resolved compiled template location"
		);

		Some(ResolvedLocation {
			file: original,
			line: Some(mapped.unwrap_or(line)),
			line_mapped: mapped.is_some(),
		})
	}
}

fn first_capture(regex: &Regex, haystack: &str) -> Option<String> {
	regex
		.captures(haystack)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().trim().to_string())
}

fn read_tail(path: &Path, window: u64) -> io::Result<String> {
	let mut file = File::open(path)?;
	let size = file.metadata()?.len();
	file.seek(SeekFrom::Start(size.saturating_sub(window)))?;

	let mut buf = Vec::with_capacity(window.min(size) as usize);
	file.read_to_end(&mut buf)?;
	Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn read_head(path: &Path, window: u64) -> io::Result<String> {
	let file = File::open(path)?;
	let mut buf = Vec::with_capacity(window as usize);
	file.take(window).read_to_end(&mut buf)?;
	Ok(String::from_utf8_lossy(&buf).into_owned())
}
