// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application-root path handling and library frame classification.

use std::path::Path;

/// Directory under the root that holds third-party dependencies.
pub const DEFAULT_DEPENDENCY_DIR: &str = "vendor";

/// Replace backslashes with forward slashes.
pub fn normalize_separators(path: &str) -> String {
	path.replace('\\', "/")
}

/// The application root that all exposed paths are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRoot {
	/// Normalized, without trailing separator; empty for the filesystem root
	root: String,
	dependency_dir: String,
}

impl AppRoot {
	/// Relative roots are anchored at the current working directory.
	pub fn new(root: impl AsRef<Path>) -> Self {
		let root = root.as_ref();
		let anchored = match std::env::current_dir() {
			Ok(cwd) if !is_absolute(&normalize_separators(&root.to_string_lossy())) => cwd.join(root),
			_ => root.to_path_buf(),
		};
		let raw = normalize_separators(&anchored.to_string_lossy());
		let root = lexical_normalize(&raw).unwrap_or(raw);
		Self {
			root: root.trim_end_matches('/').to_string(),
			dependency_dir: DEFAULT_DEPENDENCY_DIR.to_string(),
		}
	}

	/// Use a dependency directory other than `vendor`.
	pub fn with_dependency_dir(mut self, dir: impl Into<String>) -> Self {
		let dir = normalize_separators(&dir.into());
		self.dependency_dir = dir.trim_matches('/').to_string();
		self
	}

	/// Normalized root path using `/` separators.
	pub fn as_str(&self) -> &str {
		if self.root.is_empty() {
			"/"
		} else {
			&self.root
		}
	}

	pub fn dependency_dir(&self) -> &str {
		&self.dependency_dir
	}

	/// Path relative to the root, or the input unchanged when it lies elsewhere.
	pub fn relativize(&self, path: &str) -> String {
		let normalized = normalize_separators(path);
		match self.strip_root(&normalized) {
			Some(rest) => rest.trim_start_matches('/').to_string(),
			None => path.to_string(),
		}
	}

	/// Absolute, lexically normalized form of `path`; relative paths are joined to the root.
	///
	/// Returns `None` when `..` components climb above the filesystem root.
	pub fn resolve(&self, path: &str) -> Option<String> {
		let normalized = normalize_separators(path);
		if normalized.is_empty() {
			return None;
		}
		let joined = if is_absolute(&normalized) {
			normalized
		} else {
			format!("{}/{}", self.root, normalized)
		};
		lexical_normalize(&joined)
	}

	/// True when `path` lies inside the root's dependency directory.
	///
	/// Paths that cannot be placed under the root count as application code.
	pub fn is_library_frame(&self, path: &str) -> bool {
		if self.dependency_dir.is_empty() {
			return false;
		}
		let Some(resolved) = self.resolve(path) else {
			return false;
		};
		let Some(rest) = self.strip_root(&resolved) else {
			return false;
		};
		let rest = rest.trim_start_matches('/');
		rest == self.dependency_dir || rest.starts_with(&format!("{}/", self.dependency_dir))
	}

	fn strip_root<'a>(&self, normalized: &'a str) -> Option<&'a str> {
		if normalized == self.root {
			return Some("");
		}
		normalized.strip_prefix(&format!("{}/", self.root))
	}
}

fn is_absolute(path: &str) -> bool {
	let bytes = path.as_bytes();
	path.starts_with('/') || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Collapse `.` and `..` components without touching the filesystem.
fn lexical_normalize(path: &str) -> Option<String> {
	let (prefix, rest) = match path.find('/') {
		Some(0) => ("", &path[1..]),
		Some(idx) if path[..idx].ends_with(':') => (&path[..idx], &path[idx + 1..]),
		_ => return Some(path.to_string()),
	};

	let mut parts: Vec<&str> = Vec::new();
	for component in rest.split('/') {
		match component {
			"" | "." => {}
			".." => {
				parts.pop()?;
			}
			other => parts.push(other),
		}
	}
	Some(format!("{}/{}", prefix, parts.join("/")))
}
