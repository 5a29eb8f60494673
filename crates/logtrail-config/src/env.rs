// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading with the `VAR` / `VAR_FILE` convention.
//!
//! `VAR_FILE` takes precedence and names a file holding the secret (Docker and
//! Kubernetes secret mounts). A single trailing newline is stripped from file
//! contents.

use std::fs;
use std::path::PathBuf;

use crate::secret::SecretString;
use crate::ConfigError;

/// Load a secret through an arbitrary variable lookup.
pub fn load_secret_with<F>(lookup: F, var: &str) -> Result<Option<SecretString>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");
	if let Some(path) = lookup(&file_var) {
		if path.trim().is_empty() {
			return Err(ConfigError::EmptySecretPath(file_var));
		}
		let path = PathBuf::from(path);
		let content = fs::read_to_string(&path)
			.map_err(|source| ConfigError::SecretFile { path, source })?;
		let value = content
			.strip_suffix("\r\n")
			.or_else(|| content.strip_suffix('\n'))
			.unwrap_or(&content);
		return Ok(Some(SecretString::new(value.to_string())));
	}

	Ok(lookup(var).map(SecretString::new))
}

/// Load a secret from the process environment.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	load_secret_with(|name| std::env::var(name).ok(), var)
}
