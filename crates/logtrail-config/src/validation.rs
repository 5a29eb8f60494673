// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::runtime::LogtrailConfig;
use crate::ConfigError;

/// Reject configurations that cannot deliver anything.
pub fn validate_config(config: &LogtrailConfig) -> Result<(), ConfigError> {
	let endpoint = config.endpoint.trim();
	if endpoint.is_empty() {
		return Err(ConfigError::validation("endpoint must not be empty"));
	}
	if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
		return Err(ConfigError::validation(format!(
			"endpoint must be an http(s) URL, got {endpoint}"
		)));
	}
	if config.timeout_secs == 0 {
		return Err(ConfigError::validation("timeout_secs must be greater than zero"));
	}
	Ok(())
}
