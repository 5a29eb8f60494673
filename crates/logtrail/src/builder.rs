// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assembles signed payloads from log events.

use logtrail_core::{LogEvent, Payload, RequestContext, UnsignedPayload};
use serde_json::Value;

use crate::normalizer::Normalizer;
use crate::signer::Signer;

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
	normalizer: Normalizer,
	signer: Signer,
}

impl PayloadBuilder {
	pub fn new(normalizer: Normalizer, signer: Signer) -> Self {
		Self { normalizer, signer }
	}

	pub fn normalizer(&self) -> &Normalizer {
		&self.normalizer
	}

	pub fn signer(&self) -> &Signer {
		&self.signer
	}

	/// Normalize the event's exception and merge request details into its context.
	///
	/// Request headers and body are only added to a non-empty context.
	pub fn assemble(&self, event: &LogEvent, request: Option<&RequestContext>) -> UnsignedPayload {
		let mut context = self
			.normalizer
			.normalize_context(event.context.clone(), event.exception.as_ref());

		if let Some(request) = request.filter(|_| !context.is_empty()) {
			if !request.headers.is_empty() {
				context.insert(
					"request_header".to_string(),
					Value::Object(request.headers.clone()),
				);
			}
			if !request.body.is_empty() {
				context.insert("request_body".to_string(), Value::Object(request.body.clone()));
			}
		}

		UnsignedPayload {
			level: event.level,
			message: event.message.clone(),
			context,
			timestamp: event.timestamp,
		}
	}

	pub fn build(&self, event: &LogEvent, request: Option<&RequestContext>) -> Payload {
		self.signer.sign(self.assemble(event, request))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use logtrail_core::{Level, RawException};
	use logtrail_sourcemap::AppRoot;
	use serde_json::{json, Map};

	fn builder() -> PayloadBuilder {
		PayloadBuilder::new(
			Normalizer::new(AppRoot::new("/srv/app")),
			Signer::new("secret".into()),
		)
	}

	fn request() -> RequestContext {
		let mut headers = Map::new();
		headers.insert("user-agent".into(), json!(["curl/8"]));
		let mut body = Map::new();
		body.insert("q".into(), json!("shoes"));
		RequestContext {
			method: Some("GET".into()),
			headers,
			body,
			..Default::default()
		}
	}

	#[test]
	fn request_details_merge_into_non_empty_context() {
		let mut context = Map::new();
		context.insert("order".into(), json!(42));
		let event = LogEvent::new(Level::Error, "failed").with_context(context);

		let payload = builder().build(&event, Some(&request()));
		assert_eq!(payload.context()["request_header"]["user-agent"], json!(["curl/8"]));
		assert_eq!(payload.context()["request_body"]["q"], json!("shoes"));
	}

	#[test]
	fn empty_context_stays_empty() {
		let event = LogEvent::new(Level::Info, "ping");
		let payload = builder().build(&event, Some(&request()));
		assert!(payload.context().is_empty());
	}

	#[test]
	fn empty_request_maps_are_skipped() {
		let mut context = Map::new();
		context.insert("k".into(), json!("v"));
		let event = LogEvent::new(Level::Info, "ping").with_context(context);
		let payload = builder().build(&event, Some(&RequestContext::default()));
		assert_eq!(payload.context().len(), 1);
	}

	#[test]
	fn exception_location_is_signed() {
		let raw = RawException::new("Error", "boom").at("/srv/app/app/Http/Kernel.php", 77);
		let event = LogEvent::new(Level::Error, "boom").with_exception(raw);
		let builder = builder();
		let payload = builder.build(&event, None);

		assert_eq!(payload.context()["exception"]["file"], json!("app/Http/Kernel.php"));
		assert_eq!(payload.signing_input(), "errorboomapp/Http/Kernel.php77");
		assert!(builder.signer().verify(&payload));
	}

	#[test]
	fn assembled_payload_keeps_event_fields() {
		let event = LogEvent::new(Level::Notice, "hello");
		let unsigned = builder().assemble(&event, None);
		assert_eq!(unsigned.level, Level::Notice);
		assert_eq!(unsigned.message, "hello");
		assert_eq!(unsigned.timestamp, event.timestamp);
	}
}
