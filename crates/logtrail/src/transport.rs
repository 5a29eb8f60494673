// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of envelopes to the ingest endpoint.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use logtrail_config::LogtrailConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::envelope::Envelope;
use crate::error::{LogtrailSdkError, Result};

/// Gzip level used for request bodies.
pub const GZIP_LEVEL: u32 = 5;

const SIGNATURE_HEADER: &str = "x-signature";

/// Sends envelopes somewhere.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, envelope: &Envelope, token: &str) -> Result<()>;

	/// Deliver without an async runtime. Must not be called from async context.
	fn send_blocking(&self, envelope: &Envelope, token: &str) -> Result<()>;
}

/// Gzipped JSON over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
	timeout: Duration,
}

impl HttpTransport {
	pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
			timeout,
		})
	}

	pub fn from_config(config: &LogtrailConfig) -> Result<Self> {
		Self::new(config.endpoint.clone(), config.timeout())
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	fn headers(envelope: &Envelope, token: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
			headers.insert(AUTHORIZATION, value);
		}
		if let Ok(value) = HeaderValue::from_str(envelope.signature()) {
			headers.insert(SIGNATURE_HEADER, value);
		}
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		headers
	}
}

/// JSON-encode and gzip an envelope.
pub fn encode_body(envelope: &Envelope) -> Result<Vec<u8>> {
	let json = serde_json::to_vec(envelope)?;
	let mut encoder = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
	encoder.write_all(&json)?;
	Ok(encoder.finish()?)
}

fn check_status(status: StatusCode, retry_after: Option<u64>, body: String) -> Result<()> {
	if status == StatusCode::TOO_MANY_REQUESTS {
		return Err(LogtrailSdkError::RateLimited {
			retry_after_secs: retry_after,
		});
	}
	if !status.is_success() {
		let status = status.as_u16();
		warn!(status, message = %body, "ingest endpoint rejected payload");
		return Err(LogtrailSdkError::ServerError {
			status,
			message: body,
		});
	}
	Ok(())
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
	headers
		.get("Retry-After")
		.and_then(|v| v.to_str().ok())
		.and_then(|s| s.parse().ok())
}

#[async_trait]
impl Transport for HttpTransport {
	#[instrument(skip_all, fields(endpoint = %self.endpoint))]
	async fn send(&self, envelope: &Envelope, token: &str) -> Result<()> {
		let body = encode_body(envelope)?;
		debug!(bytes = body.len(), level = %envelope.payload.level(), "sending payload");

		let response = self
			.client
			.post(&self.endpoint)
			.headers(Self::headers(envelope, token))
			.body(body)
			.send()
			.await?;

		let status = response.status();
		let retry = retry_after(response.headers());
		let text = if status.is_success() {
			String::new()
		} else {
			response.text().await.unwrap_or_default()
		};
		check_status(status, retry, text)?;
		debug!(status = status.as_u16(), "payload delivered");
		Ok(())
	}

	#[instrument(skip_all, fields(endpoint = %self.endpoint))]
	fn send_blocking(&self, envelope: &Envelope, token: &str) -> Result<()> {
		let body = encode_body(envelope)?;
		debug!(bytes = body.len(), level = %envelope.payload.level(), "sending payload (blocking)");

		let client = reqwest::blocking::Client::builder()
			.timeout(self.timeout)
			.build()?;
		let response = client
			.post(&self.endpoint)
			.headers(Self::headers(envelope, token))
			.body(body)
			.send()?;

		let status = response.status();
		let retry = retry_after(response.headers());
		let text = if status.is_success() {
			String::new()
		} else {
			response.text().unwrap_or_default()
		};
		check_status(status, retry, text)?;
		debug!(status = status.as_u16(), "payload delivered");
		Ok(())
	}
}
