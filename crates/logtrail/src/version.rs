// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Short commit hash of the repository at `root`.
///
/// `None` when `root` has no `.git` directory or git is unavailable.
pub fn git_short_sha(root: &Path) -> Option<String> {
	if !root.join(".git").is_dir() {
		return None;
	}

	let output = match Command::new("git")
		.args(["rev-parse", "--short", "HEAD"])
		.current_dir(root)
		.output()
	{
		Ok(output) => output,
		Err(e) => {
			debug!(error = %e, "git unavailable, no version tag");
			return None;
		}
	};

	if !output.status.success() {
		return None;
	}
	let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
	(!sha.is_empty()).then_some(sha)
}
