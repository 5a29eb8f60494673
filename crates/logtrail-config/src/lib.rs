// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Logtrail.
//!
//! Sources are merged in precedence order:
//!
//! 1. Built-in defaults
//! 2. `/etc/logtrail/config.toml`
//! 3. `$XDG_CONFIG_HOME/logtrail/config.toml`
//! 4. `./.logtrail.toml`, or an explicit path
//! 5. `LOGTRAIL_*` environment variables
//! 6. Command-line overrides

mod env;
mod error;
mod layer;
mod registry;
mod runtime;
mod secret;
mod sources;
mod validation;

use std::path::PathBuf;

pub use env::{load_secret_env, load_secret_with};
pub use error::ConfigError;
pub use layer::{ConfigLayer, ViewsLayer};
pub use registry::ConfigRegistry;
pub use runtime::{LogtrailConfig, ViewsConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use secret::{Secret, SecretString, REDACTED};
pub use sources::{
	CliOverrides, CliSource, ConfigSource, DefaultsSource, EnvSource, FileSource, Precedence,
	ENV_API_KEY, ENV_API_SECRET, ENV_APP_ROOT, ENV_ASYNC, ENV_ENDPOINT, ENV_ENVIRONMENT,
	ENV_TEMPLATE_SOURCEMAP,
};
pub use validation::validate_config;

/// Load configuration from files and the environment.
pub fn load_config() -> Result<LogtrailConfig, ConfigError> {
	load_config_with_cli(None, CliOverrides::default())
}

/// Load configuration with an optional explicit file and CLI overrides.
///
/// An explicit file replaces `./.logtrail.toml` at workspace precedence.
pub fn load_config_with_cli(
	config_file: Option<PathBuf>,
	overrides: CliOverrides,
) -> Result<LogtrailConfig, ConfigError> {
	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(DefaultsSource));
	registry.register(Box::new(FileSource::system()));
	if let Some(user) = FileSource::user() {
		registry.register(Box::new(user));
	}
	match config_file {
		Some(path) => registry.register(Box::new(FileSource::custom(
			path,
			Precedence::WorkspaceFile,
			"explicit-config",
		))),
		None => registry.register(Box::new(FileSource::workspace()?)),
	}
	registry.register(Box::new(EnvSource::new()));
	registry.register(Box::new(CliSource::new(overrides)));
	registry.load()
}
