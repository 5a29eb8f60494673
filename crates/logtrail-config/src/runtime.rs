// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Final runtime configuration produced from merged layers.

use std::path::PathBuf;
use std::time::Duration;

use logtrail_core::Level;
use logtrail_sourcemap::{AppRoot, CompiledLayout, DEFAULT_DEPENDENCY_DIR, DEFAULT_PADDING};
use serde::Serialize;

use crate::layer::ConfigLayer;
use crate::secret::SecretString;
use crate::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://api.logtrail.site/api/v1/log/ingest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct LogtrailConfig {
	pub api_key: SecretString,
	pub api_secret: SecretString,
	pub environment: String,
	#[serde(rename = "async")]
	pub async_delivery: bool,
	pub template_sourcemap: bool,
	pub app_root: PathBuf,
	pub endpoint: String,
	pub timeout_secs: u64,
	pub snippet_padding: usize,
	pub level: Level,
	pub views: ViewsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewsConfig {
	pub compiled_dir: String,
	pub compiled_extension: String,
	pub template_extension: String,
	pub dependency_dir: String,
}

impl Default for ViewsConfig {
	fn default() -> Self {
		let layout = CompiledLayout::default();
		Self {
			compiled_dir: layout.compiled_dir,
			compiled_extension: layout.compiled_extension,
			template_extension: layout.template_extension,
			dependency_dir: DEFAULT_DEPENDENCY_DIR.to_string(),
		}
	}
}

impl Default for LogtrailConfig {
	fn default() -> Self {
		Self {
			api_key: SecretString::default(),
			api_secret: SecretString::default(),
			environment: String::new(),
			async_delivery: true,
			template_sourcemap: true,
			app_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			snippet_padding: DEFAULT_PADDING,
			level: Level::Debug,
			views: ViewsConfig::default(),
		}
	}
}

impl LogtrailConfig {
	/// Apply defaults to whatever the merged layer leaves unset.
	pub fn from_layer(layer: ConfigLayer) -> Result<Self, ConfigError> {
		let defaults = Self::default();

		let level = match layer.level {
			Some(raw) => raw
				.parse::<Level>()
				.map_err(|e| ConfigError::invalid_value("level", e.to_string()))?,
			None => defaults.level,
		};

		let views_layer = layer.views.unwrap_or_default();
		let views = ViewsConfig {
			compiled_dir: views_layer
				.compiled_dir
				.unwrap_or(defaults.views.compiled_dir),
			compiled_extension: views_layer
				.compiled_extension
				.unwrap_or(defaults.views.compiled_extension),
			template_extension: views_layer
				.template_extension
				.unwrap_or(defaults.views.template_extension),
			dependency_dir: views_layer
				.dependency_dir
				.unwrap_or(defaults.views.dependency_dir),
		};

		Ok(Self {
			api_key: layer.api_key.unwrap_or(defaults.api_key),
			api_secret: layer.api_secret.unwrap_or(defaults.api_secret),
			environment: layer.environment.unwrap_or(defaults.environment),
			async_delivery: layer.async_delivery.unwrap_or(defaults.async_delivery),
			template_sourcemap: layer
				.template_sourcemap
				.unwrap_or(defaults.template_sourcemap),
			app_root: layer.app_root.unwrap_or(defaults.app_root),
			endpoint: layer.endpoint.unwrap_or(defaults.endpoint),
			timeout_secs: layer.timeout_secs.unwrap_or(defaults.timeout_secs),
			snippet_padding: layer.snippet_padding.unwrap_or(defaults.snippet_padding),
			level,
			views,
		})
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn compiled_layout(&self) -> CompiledLayout {
		CompiledLayout {
			compiled_dir: self.views.compiled_dir.clone(),
			compiled_extension: self.views.compiled_extension.clone(),
			template_extension: self.views.template_extension.clone(),
		}
	}

	pub fn root(&self) -> AppRoot {
		AppRoot::new(&self.app_root).with_dependency_dir(self.views.dependency_dir.clone())
	}

	/// True when both credentials are present.
	pub fn has_credentials(&self) -> bool {
		!self.api_key.is_empty() && !self.api_secret.is_empty()
	}
}
