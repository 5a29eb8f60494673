// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source registry: sorts sources by precedence and merges their layers.

use tracing::{debug, info};

use crate::layer::ConfigLayer;
use crate::runtime::LogtrailConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Merge all sources lowest precedence first, then finalize and validate.
	///
	/// A file that fails to parse or an environment secret that cannot be read
	/// is an error; a missing file is not.
	pub fn load(&self) -> Result<LogtrailConfig, ConfigError> {
		let mut sorted: Vec<_> = self.sources.iter().collect();
		sorted.sort_by_key(|s| s.precedence());

		let mut merged = ConfigLayer::default();
		for source in sorted {
			let layer = source.load()?;
			debug!(source = source.name(), "merging config layer");
			merged.merge(layer);
		}

		let config = LogtrailConfig::from_layer(merged)?;
		validate_config(&config)?;

		info!(
			environment = %config.environment,
			endpoint = %config.endpoint,
			async_delivery = config.async_delivery,
			template_sourcemap = config.template_sourcemap,
			"configuration loaded"
		);

		Ok(config)
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}
