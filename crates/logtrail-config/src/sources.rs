// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, environment and CLI overrides.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::env::load_secret_with;
use crate::layer::{ConfigLayer, ViewsLayer};
use crate::secret::SecretString;
use crate::ConfigError;

pub const ENV_API_KEY: &str = "LOGTRAIL_API_KEY";
pub const ENV_API_SECRET: &str = "LOGTRAIL_API_SECRET";
pub const ENV_ENVIRONMENT: &str = "LOGTRAIL_ENV_KEY";
pub const ENV_ASYNC: &str = "LOGTRAIL_ASYNC";
pub const ENV_TEMPLATE_SOURCEMAP: &str = "LOGTRAIL_TEMPLATE_SOURCEMAP";
pub const ENV_APP_ROOT: &str = "LOGTRAIL_APP_ROOT";
pub const ENV_ENDPOINT: &str = "LOGTRAIL_ENDPOINT";

/// Source precedence levels (higher overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	WorkspaceFile = 40,
	Environment = 50,
	Cli = 60,
}

/// A place configuration can come from.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;

	fn precedence(&self) -> Precedence;

	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults. Returns an empty layer; defaults are applied when the
/// merged layer is finalized.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer.
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	/// `/etc/logtrail/config.toml`
	pub fn system() -> Self {
		Self::custom(
			PathBuf::from("/etc/logtrail/config.toml"),
			Precedence::SystemFile,
			"system-config",
		)
	}

	/// `$XDG_CONFIG_HOME/logtrail/config.toml`, if a config directory exists.
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| {
			Self::custom(
				dir.join("logtrail").join("config.toml"),
				Precedence::UserFile,
				"user-config",
			)
		})
	}

	/// `./.logtrail.toml`
	pub fn workspace() -> Result<Self, ConfigError> {
		let cwd = std::env::current_dir()?;
		Ok(Self::custom(
			cwd.join(".logtrail.toml"),
			Precedence::WorkspaceFile,
			"workspace-config",
		))
	}

	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}

	pub fn path(&self) -> &PathBuf {
		&self.path
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// `LOGTRAIL_*` environment variables.
pub struct EnvSource {
	lookup: Lookup,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Read variables through a custom lookup instead of the process environment.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Arc::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|v| !v.is_empty())
	}

	fn secret(&self, name: &str) -> Result<Option<SecretString>, ConfigError> {
		load_secret_with(|n| self.var(n), name)
	}

	fn flag(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		self.var(name).map(|raw| parse_bool(name, &raw)).transpose()
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading config from environment");

		Ok(ConfigLayer {
			api_key: self.secret(ENV_API_KEY)?,
			api_secret: self.secret(ENV_API_SECRET)?,
			environment: self.var(ENV_ENVIRONMENT),
			async_delivery: self.flag(ENV_ASYNC)?,
			template_sourcemap: self.flag(ENV_TEMPLATE_SOURCEMAP)?,
			app_root: self.var(ENV_APP_ROOT).map(PathBuf::from),
			endpoint: self.var(ENV_ENDPOINT),
			..Default::default()
		})
	}
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(ConfigError::invalid_value(
			field,
			format!("expected a boolean, got {other:?}"),
		)),
	}
}

/// Values passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub app_root: Option<PathBuf>,
	pub environment: Option<String>,
	pub endpoint: Option<String>,
	pub async_delivery: Option<bool>,
	pub template_sourcemap: Option<bool>,
	pub level: Option<String>,
	pub compiled_dir: Option<String>,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let o = self.overrides.clone();
		let views = o.compiled_dir.map(|dir| ViewsLayer {
			compiled_dir: Some(dir),
			..Default::default()
		});
		Ok(ConfigLayer {
			app_root: o.app_root,
			environment: o.environment,
			endpoint: o.endpoint,
			async_delivery: o.async_delivery,
			template_sourcemap: o.template_sourcemap,
			level: o.level,
			views,
			..Default::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use tempfile::TempDir;

	fn env(pairs: &[(&str, &str)]) -> EnvSource {
		let vars: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvSource::with_lookup(move |name| vars.get(name).cloned())
	}

	#[test]
	fn precedence_orders_lowest_first() {
		assert!(Precedence::Defaults < Precedence::SystemFile);
		assert!(Precedence::WorkspaceFile < Precedence::Environment);
		assert!(Precedence::Environment < Precedence::Cli);
	}

	#[test]
	fn missing_file_is_empty_layer() {
		let source = FileSource::custom(
			PathBuf::from("/nonexistent/logtrail.toml"),
			Precedence::UserFile,
			"test",
		);
		let layer = source.load().unwrap();
		assert!(layer.endpoint.is_none());
	}

	#[test]
	fn file_source_parses_toml() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "environment = \"production\"\ntimeout_secs = 5\n").unwrap();
		let layer = FileSource::custom(path, Precedence::WorkspaceFile, "test")
			.load()
			.unwrap();
		assert_eq!(layer.environment.as_deref(), Some("production"));
		assert_eq!(layer.timeout_secs, Some(5));
	}

	#[test]
	fn file_source_reports_parse_errors_with_path() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("broken.toml");
		std::fs::write(&path, "environment = ").unwrap();
		let err = FileSource::custom(path.clone(), Precedence::WorkspaceFile, "test")
			.load()
			.unwrap_err();
		match err {
			ConfigError::TomlParse { path: p, .. } => assert_eq!(p, path),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn env_source_reads_logtrail_vars() {
		let layer = env(&[
			(ENV_API_KEY, "key"),
			(ENV_API_SECRET, "secret"),
			(ENV_ENVIRONMENT, "staging"),
			(ENV_ASYNC, "false"),
			(ENV_TEMPLATE_SOURCEMAP, "0"),
			(ENV_APP_ROOT, "/var/www/app"),
		])
		.load()
		.unwrap();
		assert_eq!(layer.api_key.unwrap().expose(), "key");
		assert_eq!(layer.api_secret.unwrap().expose(), "secret");
		assert_eq!(layer.environment.as_deref(), Some("staging"));
		assert_eq!(layer.async_delivery, Some(false));
		assert_eq!(layer.template_sourcemap, Some(false));
		assert_eq!(layer.app_root, Some(PathBuf::from("/var/www/app")));
		assert!(layer.endpoint.is_none());
	}

	#[test]
	fn env_source_ignores_empty_values() {
		let layer = env(&[(ENV_ENVIRONMENT, ""), (ENV_API_KEY, "")]).load().unwrap();
		assert!(layer.environment.is_none());
		assert!(layer.api_key.is_none());
	}

	#[test]
	fn env_source_rejects_garbage_booleans() {
		let err = env(&[(ENV_ASYNC, "sometimes")]).load().unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn cli_source_maps_overrides() {
		let layer = CliSource::new(CliOverrides {
			level: Some("warning".into()),
			compiled_dir: Some("/cache/views/".into()),
			..Default::default()
		})
		.load()
		.unwrap();
		assert_eq!(layer.level.as_deref(), Some("warning"));
		assert_eq!(
			layer.views.unwrap().compiled_dir.as_deref(),
			Some("/cache/views/")
		);
	}
}
