// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layers. Every field is optional so that layers from
//! different sources can be merged before defaults are applied.

use std::path::PathBuf;

use serde::Deserialize;

use crate::secret::SecretString;

/// One source's view of the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
	pub api_key: Option<SecretString>,
	pub api_secret: Option<SecretString>,
	pub environment: Option<String>,
	#[serde(rename = "async")]
	pub async_delivery: Option<bool>,
	pub template_sourcemap: Option<bool>,
	pub app_root: Option<PathBuf>,
	pub endpoint: Option<String>,
	pub timeout_secs: Option<u64>,
	pub snippet_padding: Option<usize>,
	pub level: Option<String>,
	pub views: Option<ViewsLayer>,
}

/// Compiled-template layout overrides (`[views]` table).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewsLayer {
	pub compiled_dir: Option<String>,
	pub compiled_extension: Option<String>,
	pub template_extension: Option<String>,
	pub dependency_dir: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one; values present in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		overwrite(&mut self.api_key, other.api_key);
		overwrite(&mut self.api_secret, other.api_secret);
		overwrite(&mut self.environment, other.environment);
		overwrite(&mut self.async_delivery, other.async_delivery);
		overwrite(&mut self.template_sourcemap, other.template_sourcemap);
		overwrite(&mut self.app_root, other.app_root);
		overwrite(&mut self.endpoint, other.endpoint);
		overwrite(&mut self.timeout_secs, other.timeout_secs);
		overwrite(&mut self.snippet_padding, other.snippet_padding);
		overwrite(&mut self.level, other.level);
		merge_option(&mut self.views, other.views, ViewsLayer::merge);
	}
}

impl ViewsLayer {
	fn merge(&mut self, other: ViewsLayer) {
		overwrite(&mut self.compiled_dir, other.compiled_dir);
		overwrite(&mut self.compiled_extension, other.compiled_extension);
		overwrite(&mut self.template_extension, other.template_extension);
		overwrite(&mut self.dependency_dir, other.dependency_dir);
	}
}

fn overwrite<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
