// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire envelope: the signed payload plus unsigned request and version data.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use logtrail_core::Payload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What is actually posted to the ingest endpoint.
///
/// `request` and `version` are attached after signing and are not covered by
/// the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	#[serde(flatten)]
	pub payload: Payload,
	pub request: Map<String, Value>,
	pub version: Option<String>,
}

impl Envelope {
	pub fn new(payload: Payload) -> Self {
		Self {
			payload,
			request: Map::new(),
			version: None,
		}
	}

	pub fn with_request(mut self, request: Map<String, Value>) -> Self {
		self.request = request;
		self
	}

	pub fn with_version(mut self, version: Option<String>) -> Self {
		self.version = version;
		self
	}

	pub fn signature(&self) -> &str {
		self.payload.signature()
	}
}

/// Bearer token: `base64(api_key:api_secret:environment)` without padding.
pub fn authorization_token(api_key: &str, api_secret: &str, environment: &str) -> String {
	STANDARD_NO_PAD.encode(format!("{api_key}:{api_secret}:{environment}"))
}
