// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP request context attached to log events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request details captured by the host application at log time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
	pub method: Option<String>,
	/// Controller/handler name that served the route
	pub action: Option<String>,
	/// Route pattern, e.g. `users/{id}`
	pub url: Option<String>,
	pub agent: Option<String>,
	pub ip: Option<String>,
	#[serde(default)]
	pub headers: Map<String, Value>,
	#[serde(default)]
	pub body: Map<String, Value>,
}

impl RequestContext {
	/// Route summary sent as the top-level `request` field.
	///
	/// Empty when no route information was captured.
	pub fn route_summary(&self) -> Map<String, Value> {
		let mut summary = Map::new();
		if self.method.is_none() && self.action.is_none() && self.url.is_none() {
			return summary;
		}

		let fields = [
			("method", &self.method),
			("action", &self.action),
			("url", &self.url),
			("agent", &self.agent),
			("ip", &self.ip),
		];
		for (key, value) in fields {
			let value = value.clone().map(Value::String).unwrap_or(Value::Null);
			summary.insert(key.to_string(), value);
		}
		summary
	}
}
